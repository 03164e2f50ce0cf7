use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use log::{info, warn};

use crate::{
    action::{Action, NUM_ACTIONS},
    error::TableError,
    util::first_argmax,
};

/// Default number of states: 24 platforms times 4 facing directions
pub const NUM_STATES: usize = 96;

/// Default value given to every cell of an untrained table
pub const OPTIMISTIC_VALUE: f64 = 5.0;

/// A dense table of action values, one row per state and one column per [`Action`]
///
/// Every cell is finite. Rows are always exactly [`NUM_ACTIONS`] wide.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: Vec<[f64; NUM_ACTIONS]>,
}

impl QTable {
    /// A table of `num_states` rows with every cell set to `value`
    pub fn filled(num_states: usize, value: f64) -> Self {
        Self {
            rows: vec![[value; NUM_ACTIONS]; num_states],
        }
    }

    /// A table of `num_states` rows of zeros
    pub fn zeros(num_states: usize) -> Self {
        Self::filled(num_states, 0.0)
    }

    /// Load a persisted table, falling back to a fresh one on any failure
    ///
    /// A missing, unreadable or misshapen file is logged and discarded. If the resulting
    /// table has never been trained (every cell is exactly zero) it is replaced by an
    /// optimistic table filled with `optimistic_value`, so that every action looks worth
    /// trying and greedy ties do not all fall to [`Action::Left`].
    pub fn load(path: impl AsRef<Path>, num_states: usize, optimistic_value: f64) -> Self {
        let path = path.as_ref();
        let table = match Self::try_load(path, num_states) {
            Ok(table) => {
                info!("loaded value table from {}", path.display());
                table
            }
            Err(e) => {
                warn!("starting from a fresh value table: {e}");
                Self::zeros(num_states)
            }
        };

        if table.is_untrained() {
            info!("value table is untrained, initializing every value to {optimistic_value}");
            Self::filled(num_states, optimistic_value)
        } else {
            table
        }
    }

    /// Strictly read a persisted table of `num_states` rows
    pub fn try_load(path: impl AsRef<Path>, num_states: usize) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&text, num_states)
    }

    fn parse(text: &str, num_states: usize) -> Result<Self, TableError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() != num_states {
            return Err(TableError::RowCount {
                expected: num_states,
                found: lines.len(),
            });
        }

        let mut rows = Vec::with_capacity(num_states);
        for (row, line) in lines.into_iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != NUM_ACTIONS {
                return Err(TableError::ColumnCount {
                    row,
                    expected: NUM_ACTIONS,
                    found: tokens.len(),
                });
            }
            let mut values = [0.0; NUM_ACTIONS];
            for (value, token) in values.iter_mut().zip(tokens) {
                *value = token
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| TableError::BadValue {
                        row,
                        token: token.to_owned(),
                    })?;
            }
            rows.push(values);
        }
        Ok(Self { rows })
    }

    /// Persist the table as one line per state of space-separated values
    ///
    /// Values use the shortest representation that parses back to the same float,
    /// so [`QTable::try_load`] reproduces the table exactly.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        let io_err = |source| TableError::Io {
            path: path.to_owned(),
            source,
        };

        let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
        for row in &self.rows {
            let line = row
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{line}").map_err(io_err)?;
        }
        out.flush().map_err(io_err)
    }

    /// Number of states (rows)
    pub fn num_states(&self) -> usize {
        self.rows.len()
    }

    /// `true` if every cell is exactly zero
    pub fn is_untrained(&self) -> bool {
        self.rows.iter().flatten().all(|&v| v == 0.0)
    }

    /// The values of every action in `state`
    ///
    /// **Panics** if `state` is out of range
    pub fn row(&self, state: usize) -> &[f64; NUM_ACTIONS] {
        &self.rows[state]
    }

    pub fn get(&self, state: usize, action: Action) -> f64 {
        self.rows[state][action.index()]
    }

    /// **Panics** if `value` is not finite
    pub fn set(&mut self, state: usize, action: Action, value: f64) {
        assert!(value.is_finite(), "Q values must be finite, got {value}");
        self.rows[state][action.index()] = value;
    }

    /// The greedy action in `state`; ties go to the action with the lowest index
    pub fn best_action(&self, state: usize) -> Action {
        first_argmax(&self.rows[state])
            .and_then(Action::from_repr)
            .unwrap_or(Action::Left)
    }

    /// The value of the greedy action in `state`
    pub fn max_value(&self, state: usize) -> f64 {
        self.get(state, self.best_action(state))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn sample_table() -> QTable {
        let mut table = QTable::zeros(4);
        table.set(0, Action::Jump, 1.25);
        table.set(1, Action::Left, -0.1);
        table.set(2, Action::Right, 0.1 + 0.2);
        table.set(3, Action::Jump, 1e-12);
        table
    }

    #[test]
    fn best_action_breaks_ties_low() {
        let mut table = QTable::zeros(2);
        table.set(0, Action::Left, 2.0);
        table.set(0, Action::Right, 2.0);
        table.set(0, Action::Jump, 1.0);
        assert_eq!(table.best_action(0), Action::Left);
        assert_eq!(table.max_value(0), 2.0);

        table.set(1, Action::Right, 3.0);
        table.set(1, Action::Jump, 3.0);
        assert_eq!(table.best_action(1), Action::Right);
    }

    #[test]
    fn best_action_all_equal_is_first() {
        let table = QTable::filled(1, OPTIMISTIC_VALUE);
        assert_eq!(table.best_action(0), Action::Left);
    }

    #[test]
    fn save_then_load_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.txt");
        let table = sample_table();

        table.save(&path).unwrap();
        assert_eq!(QTable::try_load(&path, 4).unwrap(), table);
        assert_eq!(QTable::load(&path, 4, OPTIMISTIC_VALUE), table);
    }

    #[test]
    fn saved_format_is_one_line_per_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("table.txt");
        sample_table().save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0 0 1.25");
        assert_eq!(lines[1], "-0.1 0 0");
        for line in lines {
            assert_eq!(line.split(' ').count(), NUM_ACTIONS);
        }
    }

    #[test]
    fn all_zero_file_loads_optimistic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zeros.txt");
        fs::write(&path, "0 0 0\n".repeat(NUM_STATES)).unwrap();

        let table = QTable::load(&path, NUM_STATES, OPTIMISTIC_VALUE);
        assert_eq!(table.num_states(), NUM_STATES);
        assert!(table.rows.iter().flatten().all(|&v| v == OPTIMISTIC_VALUE));
    }

    #[test]
    fn missing_file_loads_optimistic() {
        let dir = tempdir().unwrap();
        let table = QTable::load(dir.path().join("nope.txt"), NUM_STATES, 2.5);
        assert_eq!(table, QTable::filled(NUM_STATES, 2.5));
        assert!(matches!(
            QTable::try_load(dir.path().join("nope.txt"), NUM_STATES),
            Err(TableError::Io { .. })
        ));
    }

    #[test]
    fn misshapen_files_are_rejected() {
        assert!(matches!(
            QTable::parse("1 2 3\n", 2),
            Err(TableError::RowCount {
                expected: 2,
                found: 1
            })
        ));
        assert!(matches!(
            QTable::parse("1 2 3\n1 2\n", 2),
            Err(TableError::ColumnCount { row: 1, found: 2, .. })
        ));
        assert!(matches!(
            QTable::parse("1 2 3\n1 x 3\n", 2),
            Err(TableError::BadValue { row: 1, .. })
        ));
        assert!(matches!(
            QTable::parse("1 2 inf\n1 2 3\n", 2),
            Err(TableError::BadValue { row: 0, .. })
        ));

        let dir = tempdir().unwrap();
        let path = dir.path().join("short.txt");
        fs::write(&path, "1 2 3\n".repeat(NUM_STATES - 1)).unwrap();
        assert_eq!(
            QTable::load(&path, NUM_STATES, OPTIMISTIC_VALUE),
            QTable::filled(NUM_STATES, OPTIMISTIC_VALUE)
        );
    }

    #[test]
    fn save_reports_io_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("table.txt");
        assert!(matches!(
            sample_table().save(&path),
            Err(TableError::Io { .. })
        ));
    }
}
