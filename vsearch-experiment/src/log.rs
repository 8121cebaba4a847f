use crate::frontend::ResultLog;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Comma-separated results file, flushed after every row so an interrupted
/// run keeps everything logged so far.
pub struct CsvResultLog<W: Write> {
    out: W,
}

impl CsvResultLog<BufWriter<File>> {
    pub fn create(path: &Path) -> io::Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> CsvResultLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record<S: AsRef<str>>(&mut self, fields: &[S]) -> io::Result<()> {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
            }
            write_field(&mut self.out, field.as_ref())?;
        }
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write> ResultLog for CsvResultLog<W> {
    fn declare_header(&mut self, columns: &[&str]) -> io::Result<()> {
        self.write_record(columns)
    }

    fn log_row(&mut self, values: &[String]) -> io::Result<()> {
        self.write_record(values)
    }
}

fn write_field<W: Write>(out: &mut W, field: &str) -> io::Result<()> {
    if field.contains([',', '"', '\n', '\r']) {
        write!(out, "\"{}\"", field.replace('"', "\"\""))
    } else {
        out.write_all(field.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_then_rows() {
        let mut log = CsvResultLog::new(Vec::new());
        log.declare_header(&["trial", "rt"]).unwrap();
        log.log_row(&["0".to_string(), "512".to_string()]).unwrap();
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(text, "trial,rt\n0,512\n");
    }

    #[test]
    fn quotes_awkward_fields() {
        let mut log = CsvResultLog::new(Vec::new());
        log.log_row(&["a,b".to_string(), "say \"hi\"".to_string(), "n/a".to_string()])
            .unwrap();
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(text, "\"a,b\",\"say \"\"hi\"\"\",n/a\n");
    }
}
