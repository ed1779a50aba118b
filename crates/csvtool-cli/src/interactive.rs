//! Guided menu flow that turns prompt answers into a [`Request`]

use crate::prompt::Prompter;
use crate::request::{Operation, Request};
use csvtool_core::{
    discover_csv_files, read_table, FilterOperator, FilterSpec, Result, SortOrder, SortSpec,
    SortType, SplitMode, SplitSpec,
};
use std::path::{Path, PathBuf};
use tracing::warn;

/// How deep the file picker looks below the working directory
const DISCOVERY_DEPTH: usize = 4;

const MANUAL_ENTRY: &str = "Enter a path manually";

/// One interactive run, bound to a prompter and a working directory
pub struct Session<P> {
    prompter: P,
    root: PathBuf,
}

impl<P: Prompter> Session<P> {
    pub fn new(prompter: P, root: impl Into<PathBuf>) -> Self {
        Self {
            prompter,
            root: root.into(),
        }
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// Walk the user through choosing an operation and its parameters
    pub fn collect_request(&mut self) -> Result<Request> {
        let operation = self.select_operation()?;

        let request = match operation {
            Operation::Merge => {
                let inputs = self.prompt_merge_files()?;
                let output = self.prompt_output(operation)?;
                Request::Merge { inputs, output }
            }
            Operation::Diff | Operation::Intersect => {
                let left = self.select_file("Source file (csv1):")?;
                let right = self.select_file("Comparison file (csv2):")?;
                let key = self.prompt_column("Key to use:", &left)?;
                let output = self.prompt_output(operation)?;
                if operation == Operation::Diff {
                    Request::Diff {
                        left,
                        right,
                        key,
                        output,
                    }
                } else {
                    Request::Intersect {
                        left,
                        right,
                        key,
                        output,
                    }
                }
            }
            Operation::Duplicates => {
                let input = self.select_file("File to analyze:")?;
                let key = self.prompt_column("Key to detect duplicates:", &input)?;
                let output = self.prompt_output(operation)?;
                Request::Duplicates { input, key, output }
            }
            Operation::Split => {
                let input = self.select_file("Select the CSV file to split:")?;
                let spec = self.prompt_split_spec()?;
                let pattern = self.prompter.input(
                    "Base name for output files",
                    Some(operation.default_output()),
                )?;
                Request::Split {
                    input,
                    spec,
                    pattern: self.root.join(pattern).to_string_lossy().into_owned(),
                }
            }
            Operation::Filter => {
                let input = self.select_file("File to filter:")?;
                let column = self.prompt_column("Column to filter on:", &input)?;
                let operator = self.pick(
                    "Filter operator:",
                    &FilterOperator::ALL,
                    |op| format!("{:<13} ({})", op.name(), op.description()),
                )?;
                let value = if operator.takes_value() {
                    self.prompter.input("Value to compare against", None)?
                } else {
                    String::new()
                };
                let output = self.prompt_output(operation)?;
                Request::Filter {
                    input,
                    spec: FilterSpec::new(column, operator, value),
                    output,
                }
            }
            Operation::Sort => {
                let input = self.select_file("File to sort:")?;
                let column = self.prompt_column("Column to sort by:", &input)?;
                let order = self.pick("Sort order:", &SortOrder::ALL, |o| match o {
                    SortOrder::Asc => "asc  (ascending)".to_string(),
                    SortOrder::Desc => "desc (descending)".to_string(),
                })?;
                let data_type = self.pick("Data type:", &SortType::ALL, |t| match t {
                    SortType::Auto => "auto   (detect from values)".to_string(),
                    other => other.name().to_string(),
                })?;
                let output = self.prompt_output(operation)?;
                Request::Sort {
                    input,
                    spec: SortSpec::new(column, order, data_type),
                    output,
                }
            }
        };

        Ok(request)
    }

    fn select_operation(&mut self) -> Result<Operation> {
        self.pick("Choose an operation:", &Operation::ALL, Operation::label)
    }

    /// Offer `options` by label and return the chosen one
    fn pick<T: Copy>(
        &mut self,
        message: &str,
        options: &[T],
        label: impl Fn(&T) -> String,
    ) -> Result<T> {
        let labels: Vec<String> = options.iter().map(label).collect();
        let idx = self.prompter.select(message, &labels)?;
        Ok(options[idx])
    }

    /// Pick a discovered CSV under the root, or type a path
    fn select_file(&mut self, message: &str) -> Result<PathBuf> {
        let files = discover_csv_files(&self.root, DISCOVERY_DEPTH)?;

        let mut choices: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&self.root).unwrap_or(p.as_path()).display().to_string())
            .collect();
        choices.push(MANUAL_ENTRY.to_string());

        let idx = self.prompter.select(message, &choices)?;
        match files.get(idx) {
            Some(path) => Ok(path.clone()),
            None => self.prompt_path("Relative path of the file"),
        }
    }

    fn prompt_path(&mut self, message: &str) -> Result<PathBuf> {
        let answer = self.prompter.input(message, None)?;
        Ok(self.root.join(answer))
    }

    fn prompt_merge_files(&mut self) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = Vec::new();

        loop {
            let mut choices = vec![
                "Select a file from the list".to_string(),
                MANUAL_ENTRY.to_string(),
            ];
            if !files.is_empty() {
                choices.push(format!("Start merge with {} file(s)", files.len()));
            }

            let message = format!("Add files to merge ({} current):", files.len());
            match self.prompter.select(&message, &choices)? {
                0 => files.push(self.select_file("Select a file to add:")?),
                1 => files.push(self.prompt_path("Relative path of the file to add")?),
                _ => return Ok(files),
            }
        }
    }

    /// Choose a column from the file's header, or type one if it can't be read
    fn prompt_column(&mut self, message: &str, file: &Path) -> Result<String> {
        match read_table(file) {
            Ok(table) if !table.columns.is_empty() => {
                let idx = self.prompter.select(message, &table.columns)?;
                Ok(table.columns[idx].clone())
            }
            Ok(_) => Ok(self.prompter.input(message, None)?),
            Err(e) => {
                warn!(path = %file.display(), "could not read columns: {e}");
                Ok(self.prompter.input(message, None)?)
            }
        }
    }

    fn prompt_output(&mut self, operation: Operation) -> Result<PathBuf> {
        let answer = self
            .prompter
            .input("Output file name", Some(operation.default_output()))?;
        Ok(self.root.join(answer))
    }

    fn prompt_split_spec(&mut self) -> Result<SplitSpec> {
        let mode = self.pick("Choose the split mode:", &SplitMode::ALL, |m| {
            format!("{:<9} ({})", m.name(), m.description())
        })?;
        let message = match mode {
            SplitMode::FileCount => "Number of files to generate",
            SplitMode::MaxLines => "Maximum number of lines per file",
        };

        loop {
            let answer = self.prompter.input(message, None)?;
            match SplitSpec::parse(mode.name(), &answer) {
                Ok(spec) => return Ok(spec),
                Err(_) => self
                    .prompter
                    .message("Enter a valid number greater than 0.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::TerminalPrompter;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    type Scripted = TerminalPrompter<Cursor<Vec<u8>>, Vec<u8>>;

    fn session(dir: &TempDir, script: &[&str]) -> Session<Scripted> {
        let mut input = script.join("\n");
        input.push('\n');
        let prompter = TerminalPrompter::new(Cursor::new(input.into_bytes()), Vec::new());
        Session::new(prompter, dir.path())
    }

    fn shown(session: Session<Scripted>) -> String {
        String::from_utf8(session.into_prompter().into_output()).unwrap()
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "id,name\n1,Ann\n").unwrap();
        fs::write(dir.path().join("people.csv"), "email,name,age\nx@y.z,X,3\n").unwrap();
        dir
    }

    #[test]
    fn test_duplicates_flow_with_defaults() {
        let dir = fixture();
        // duplicates, people.csv, email, default output
        let mut s = session(&dir, &["4", "2", "1", ""]);

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Duplicates {
                input: dir.path().join("people.csv"),
                key: "email".to_string(),
                output: dir.path().join("duplicates.csv"),
            }
        );

        let out = shown(s);
        assert!(out.contains("duplicates  (duplicates in a single file)"));
        assert!(out.contains(MANUAL_ENTRY));
        assert!(out.contains("Output file name (duplicates.csv): "));
    }

    #[test]
    fn test_merge_flow_collects_files_until_done() {
        let dir = fixture();
        let mut s = session(
            &dir,
            &[
                "1",       // merge
                "1",       // select from list
                "2",       // people.csv
                "2",       // manual entry
                "a.csv",   // typed path
                "3",       // start merge
                "all.csv", // output
            ],
        );

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Merge {
                inputs: vec![dir.path().join("people.csv"), dir.path().join("a.csv")],
                output: dir.path().join("all.csv"),
            }
        );
        assert!(shown(s).contains("Start merge with 2 file(s)"));
    }

    #[test]
    fn test_merge_cannot_start_without_files() {
        let dir = fixture();
        // "3" is out of range while no file has been added
        let mut s = session(&dir, &["1", "3", "2", "a.csv", "3", ""]);

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Merge {
                inputs: vec![dir.path().join("a.csv")],
                output: dir.path().join("merged.csv"),
            }
        );
    }

    #[test]
    fn test_diff_falls_back_to_typed_key_when_header_unreadable() {
        let dir = fixture();
        // diff, manual "missing.csv", a.csv, typed key, default output
        let mut s = session(&dir, &["2", "3", "missing.csv", "1", "id", ""]);

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Diff {
                left: dir.path().join("missing.csv"),
                right: dir.path().join("a.csv"),
                key: "id".to_string(),
                output: dir.path().join("diff.csv"),
            }
        );
    }

    #[test]
    fn test_split_reprompts_invalid_values() {
        let dir = fixture();
        // split, a.csv, maxLines, bad values then 4, default pattern
        let mut s = session(&dir, &["5", "1", "2", "0", "abc", "4", ""]);

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Split {
                input: dir.path().join("a.csv"),
                spec: SplitSpec::new(SplitMode::MaxLines, 4).unwrap(),
                pattern: dir.path().join("split_part").to_string_lossy().into_owned(),
            }
        );
        assert_eq!(
            shown(s).matches("Enter a valid number greater than 0.").count(),
            2
        );
    }

    #[test]
    fn test_filter_without_value_operator() {
        let dir = fixture();
        // filter, people.csv, age, "empty" operator, default output
        let mut s = session(&dir, &["6", "2", "3", "9", ""]);

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Filter {
                input: dir.path().join("people.csv"),
                spec: FilterSpec::new("age", FilterOperator::Empty, ""),
                output: dir.path().join("filtered.csv"),
            }
        );
    }

    #[test]
    fn test_filter_with_value() {
        let dir = fixture();
        let mut s = session(&dir, &["6", "2", "3", "7", "18", "adults.csv"]);

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Filter {
                input: dir.path().join("people.csv"),
                spec: FilterSpec::new("age", FilterOperator::GreaterThan, "18"),
                output: dir.path().join("adults.csv"),
            }
        );
    }

    #[test]
    fn test_sort_flow() {
        let dir = fixture();
        // sort, a.csv, name, desc, number
        let mut s = session(&dir, &["7", "1", "2", "2", "3", "out.json"]);

        let request = s.collect_request().unwrap();
        assert_eq!(
            request,
            Request::Sort {
                input: dir.path().join("a.csv"),
                spec: SortSpec::new("name", SortOrder::Desc, SortType::Number),
                output: dir.path().join("out.json"),
            }
        );
    }

    #[test]
    fn test_closed_input_aborts() {
        let dir = fixture();
        let prompter = TerminalPrompter::new(Cursor::new(Vec::new()), Vec::new());
        let mut s = Session::new(prompter, dir.path());
        assert!(s.collect_request().is_err());
    }
}
