use anyhow::{Context, Result};
use std::io::Write;

/// A column-named, row-ordered view shared by every table this crate returns.
pub trait Tabular {
    fn columns(&self) -> Vec<&str>;

    /// Rows rendered as text, one cell per column.
    fn string_rows(&self) -> Vec<Vec<String>>;

    fn len(&self) -> usize {
        self.string_rows().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes a header line followed by every row.
    fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(self.columns())
            .context("failed to write CSV header")?;
        for row in self.string_rows() {
            out.write_record(&row).context("failed to write CSV row")?;
        }
        out.flush().context("failed to flush CSV output")?;
        Ok(())
    }

    fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).context("CSV output is not valid UTF-8")
    }
}
