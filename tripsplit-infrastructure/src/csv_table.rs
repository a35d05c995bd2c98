use std::{
    fs::File,
    io::{Read, Write},
    path::PathBuf,
};
use tripsplit_application::{LedgerSourceError, TableSource};
use tripsplit_domain::{Table, Value};

/// A CSV file read as a [`Table`], cell types inferred per value.
#[derive(Clone, Debug)]
pub struct CsvTableSource {
    path: PathBuf,
    name: String,
}

impl CsvTableSource {
    /// The table is named after the file unless renamed with [`Self::named`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl TableSource for CsvTableSource {
    fn load_table(&self) -> Result<Table, LedgerSourceError> {
        let unreadable = |detail: String| LedgerSourceError::Unreadable {
            location: self.path.display().to_string(),
            detail,
        };
        let file = File::open(&self.path).map_err(|err| unreadable(err.to_string()))?;
        let table = read_table(&self.name, file).map_err(|err| unreadable(err.to_string()))?;
        tracing::debug!(
            path = %self.path.display(),
            table = %self.name,
            row_count = table.len(),
            "Table loaded"
        );
        Ok(table)
    }
}

pub fn read_table<R: Read>(name: &str, reader: R) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(name, columns);
    for record in reader.records() {
        table.push_row(record?.iter().map(Value::infer).collect());
    }
    Ok(table)
}

pub struct CsvTableWriter;

impl CsvTableWriter {
    pub fn write<W: Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(table.columns())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn render(table: &Table) -> Result<String, csv::Error> {
        let mut buffer = Vec::new();
        Self::write(table, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
