/// Builds table directory paths under an output root, for both local paths and URLs.
pub struct PathBuilder {
    location: String,
    table: Option<String>,
}

impl PathBuilder {
    pub fn new(location: &str) -> Self {
        Self {
            location: location.trim_end_matches('/').to_string(),
            table: None,
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = Some(table.to_string());
        self
    }

    /// Directory of the table, always with a trailing `/` so the engine treats it
    /// as a directory even before it exists.
    pub fn build_table_path(&self) -> String {
        match &self.table {
            Some(table) => format!("{}/{}/", self.location, table),
            None => format!("{}/", self.location),
        }
    }

    pub fn build_file_path(&self, filename: &str) -> String {
        format!("{}{}", self.build_table_path(), filename)
    }
}
