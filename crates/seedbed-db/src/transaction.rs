//! Transaction state machine.
//!
//! [`TransactionManager`] tracks autocommit mode and the stack of open atomic
//! blocks for one connection. It performs no I/O: every transition returns
//! the SQL statements the connection has to run.

use crate::error::{DatabaseError, Result};

/// Transaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
	/// No transaction is open.
	Idle,
	/// A transaction is open on the connection.
	Active,
}

/// Savepoint for nested atomic blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savepoint {
	pub name: String,
	pub depth: usize,
}

impl Savepoint {
	/// Create a new savepoint with name and depth
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::transaction::Savepoint;
	///
	/// let sp = Savepoint::new("sp_1", 1);
	/// assert_eq!(sp.name, "sp_1");
	/// assert_eq!(sp.depth, 1);
	/// ```
	pub fn new(name: impl Into<String>, depth: usize) -> Self {
		Self {
			name: name.into(),
			depth,
		}
	}

	/// Generate SQL for creating this savepoint
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::transaction::Savepoint;
	///
	/// let sp = Savepoint::new("sp_2", 2);
	/// assert_eq!(sp.to_sql(), "SAVEPOINT \"sp_2\"");
	/// ```
	pub fn to_sql(&self) -> String {
		format!("SAVEPOINT \"{}\"", self.name)
	}

	/// Generate SQL for releasing this savepoint
	pub fn release_sql(&self) -> String {
		format!("RELEASE SAVEPOINT \"{}\"", self.name)
	}

	/// Generate SQL for rolling back to this savepoint
	pub fn rollback_sql(&self) -> String {
		format!("ROLLBACK TO SAVEPOINT \"{}\"", self.name)
	}
}

/// One open atomic block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AtomicFrame {
	/// Outermost block that issued `BEGIN`.
	Transaction,
	/// Nested block, or a block opened while autocommit was disabled.
	Savepoint(Savepoint),
}

const FORBIDDEN_IN_ATOMIC: &str = "This is forbidden when an 'atomic' block is active.";

/// Transaction manager for a single connection
#[derive(Debug)]
pub struct TransactionManager {
	autocommit: bool,
	in_transaction: bool,
	frames: Vec<AtomicFrame>,
	savepoint_counter: usize,
	pending: Vec<String>,
}

impl TransactionManager {
	/// Create a manager in autocommit mode
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::transaction::{TransactionManager, TransactionState};
	///
	/// let tx = TransactionManager::new();
	/// assert!(tx.autocommit());
	/// assert_eq!(tx.state(), TransactionState::Idle);
	/// assert_eq!(tx.depth(), 0);
	/// ```
	pub fn new() -> Self {
		Self {
			autocommit: true,
			in_transaction: false,
			frames: Vec::new(),
			savepoint_counter: 0,
			pending: Vec::new(),
		}
	}

	pub fn autocommit(&self) -> bool {
		self.autocommit
	}

	pub fn state(&self) -> TransactionState {
		if self.in_transaction {
			TransactionState::Active
		} else {
			TransactionState::Idle
		}
	}

	/// Number of open atomic blocks
	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	pub fn in_atomic_block(&self) -> bool {
		!self.frames.is_empty()
	}

	/// True when the caller owns the transaction: autocommit is disabled or
	/// an atomic block is open.
	pub fn is_managed(&self) -> bool {
		!self.autocommit || self.in_atomic_block()
	}

	/// Switch autocommit mode
	///
	/// Disabling autocommit opens a transaction. Enabling it commits the
	/// open transaction, if any.
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::transaction::TransactionManager;
	///
	/// let mut tx = TransactionManager::new();
	/// assert_eq!(tx.set_autocommit(false).unwrap(), vec!["BEGIN".to_string()]);
	/// assert_eq!(tx.set_autocommit(true).unwrap(), vec!["COMMIT".to_string()]);
	/// ```
	pub fn set_autocommit(&mut self, autocommit: bool) -> Result<Vec<String>> {
		if self.in_atomic_block() {
			return Err(DatabaseError::TransactionError(
				FORBIDDEN_IN_ATOMIC.to_string(),
			));
		}
		if autocommit == self.autocommit {
			return Ok(Vec::new());
		}
		self.autocommit = autocommit;
		if autocommit {
			if self.in_transaction {
				self.in_transaction = false;
				return Ok(vec!["COMMIT".to_string()]);
			}
			Ok(Vec::new())
		} else {
			self.in_transaction = true;
			Ok(vec!["BEGIN".to_string()])
		}
	}

	/// Commit the manual transaction and open the next one
	pub fn commit(&mut self) -> Result<Vec<String>> {
		self.ensure_manual("commit")?;
		Ok(vec!["COMMIT".to_string(), "BEGIN".to_string()])
	}

	/// Roll back the manual transaction and open the next one
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::transaction::TransactionManager;
	///
	/// let mut tx = TransactionManager::new();
	/// assert!(tx.rollback().is_err());
	///
	/// tx.set_autocommit(false).unwrap();
	/// assert_eq!(tx.rollback().unwrap(), vec!["ROLLBACK".to_string(), "BEGIN".to_string()]);
	/// ```
	pub fn rollback(&mut self) -> Result<Vec<String>> {
		self.ensure_manual("rollback")?;
		Ok(vec!["ROLLBACK".to_string(), "BEGIN".to_string()])
	}

	fn ensure_manual(&self, operation: &str) -> Result<()> {
		if self.in_atomic_block() {
			return Err(DatabaseError::TransactionError(
				FORBIDDEN_IN_ATOMIC.to_string(),
			));
		}
		if self.autocommit {
			return Err(DatabaseError::TransactionError(format!(
				"{}() requires autocommit to be disabled",
				operation
			)));
		}
		Ok(())
	}

	/// Open an atomic block
	///
	/// Returns the depth of the new block and the SQL to run. The outermost
	/// block in autocommit mode begins a transaction; any other block
	/// creates a savepoint.
	///
	/// # Examples
	///
	/// ```
	/// use seedbed_db::transaction::TransactionManager;
	///
	/// let mut tx = TransactionManager::new();
	/// let (depth, sql) = tx.enter_atomic();
	/// assert_eq!(depth, 1);
	/// assert_eq!(sql, vec!["BEGIN".to_string()]);
	///
	/// let (depth, sql) = tx.enter_atomic();
	/// assert_eq!(depth, 2);
	/// assert!(sql[0].starts_with("SAVEPOINT"));
	/// ```
	pub fn enter_atomic(&mut self) -> (usize, Vec<String>) {
		let sql = if self.frames.is_empty() && self.autocommit && !self.in_transaction {
			self.in_transaction = true;
			self.frames.push(AtomicFrame::Transaction);
			"BEGIN".to_string()
		} else {
			self.savepoint_counter += 1;
			let savepoint = Savepoint::new(
				format!("sp_{}", self.savepoint_counter),
				self.frames.len() + 1,
			);
			let sql = savepoint.to_sql();
			self.frames.push(AtomicFrame::Savepoint(savepoint));
			sql
		};
		(self.frames.len(), vec![sql])
	}

	/// Close the innermost atomic block
	///
	/// `depth` must be the value returned by the matching
	/// [`enter_atomic`](Self::enter_atomic) call.
	pub fn exit_atomic(&mut self, depth: usize, commit: bool) -> Result<Vec<String>> {
		if depth == 0 || depth != self.frames.len() {
			return Err(DatabaseError::TransactionError(format!(
				"Atomic block at depth {} is not the innermost open block (depth {})",
				depth,
				self.frames.len()
			)));
		}
		let frame = self.frames.pop().ok_or_else(|| {
			DatabaseError::TransactionError("No atomic block is open".to_string())
		})?;
		Ok(match frame {
			AtomicFrame::Transaction => {
				self.in_transaction = false;
				if commit {
					vec!["COMMIT".to_string()]
				} else {
					vec!["ROLLBACK".to_string()]
				}
			}
			AtomicFrame::Savepoint(savepoint) => {
				if commit {
					vec![savepoint.release_sql()]
				} else {
					vec![savepoint.rollback_sql(), savepoint.release_sql()]
				}
			}
		})
	}

	/// Roll back an atomic block whose guard was dropped without being closed
	///
	/// Blocks opened inside it are rolled back first. The SQL is queued and
	/// returned by [`take_pending`](Self::take_pending).
	pub fn abandon_atomic(&mut self, depth: usize) {
		while self.frames.len() >= depth && depth > 0 {
			let current = self.frames.len();
			match self.exit_atomic(current, false) {
				Ok(sql) => self.pending.extend(sql),
				Err(_) => break,
			}
		}
	}

	/// Drain SQL queued by abandoned atomic blocks
	pub fn take_pending(&mut self) -> Vec<String> {
		std::mem::take(&mut self.pending)
	}
}

impl Default for TransactionManager {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_nested_atomic_uses_savepoints() {
		let mut tx = TransactionManager::new();
		let (outer, _) = tx.enter_atomic();
		let (inner, sql) = tx.enter_atomic();
		assert_eq!(sql, vec!["SAVEPOINT \"sp_1\"".to_string()]);

		assert_eq!(
			tx.exit_atomic(inner, false).unwrap(),
			vec![
				"ROLLBACK TO SAVEPOINT \"sp_1\"".to_string(),
				"RELEASE SAVEPOINT \"sp_1\"".to_string(),
			]
		);
		assert_eq!(tx.exit_atomic(outer, true).unwrap(), vec!["COMMIT"]);
		assert_eq!(tx.state(), TransactionState::Idle);
	}

	#[rstest]
	fn test_atomic_in_manual_mode_uses_savepoint() {
		let mut tx = TransactionManager::new();
		tx.set_autocommit(false).unwrap();
		let (depth, sql) = tx.enter_atomic();
		assert!(sql[0].starts_with("SAVEPOINT"));
		assert_eq!(
			tx.exit_atomic(depth, true).unwrap(),
			vec!["RELEASE SAVEPOINT \"sp_1\"".to_string()]
		);
		assert_eq!(tx.state(), TransactionState::Active);
	}

	#[rstest]
	fn test_exit_out_of_order_is_rejected() {
		let mut tx = TransactionManager::new();
		let (outer, _) = tx.enter_atomic();
		let (_inner, _) = tx.enter_atomic();
		assert!(tx.exit_atomic(outer, true).is_err());
		assert_eq!(tx.depth(), 2);
	}

	#[rstest]
	fn test_autocommit_toggle_forbidden_in_atomic() {
		let mut tx = TransactionManager::new();
		let _ = tx.enter_atomic();
		assert!(matches!(
			tx.set_autocommit(false),
			Err(DatabaseError::TransactionError(_))
		));
		assert!(tx.commit().is_err());
	}

	#[rstest]
	fn test_is_managed() {
		let mut tx = TransactionManager::new();
		assert!(!tx.is_managed());
		tx.set_autocommit(false).unwrap();
		assert!(tx.is_managed());
		tx.set_autocommit(true).unwrap();
		let (depth, _) = tx.enter_atomic();
		assert!(tx.is_managed());
		tx.exit_atomic(depth, true).unwrap();
		assert!(!tx.is_managed());
	}

	#[rstest]
	fn test_set_autocommit_is_idempotent() {
		let mut tx = TransactionManager::new();
		assert!(tx.set_autocommit(true).unwrap().is_empty());
		tx.set_autocommit(false).unwrap();
		assert!(tx.set_autocommit(false).unwrap().is_empty());
	}

	#[rstest]
	fn test_abandon_rolls_back_nested_blocks() {
		let mut tx = TransactionManager::new();
		let (outer, _) = tx.enter_atomic();
		let _ = tx.enter_atomic();
		tx.abandon_atomic(outer);

		assert_eq!(tx.depth(), 0);
		assert_eq!(
			tx.take_pending(),
			vec![
				"ROLLBACK TO SAVEPOINT \"sp_1\"".to_string(),
				"RELEASE SAVEPOINT \"sp_1\"".to_string(),
				"ROLLBACK".to_string(),
			]
		);
		assert!(tx.take_pending().is_empty());
	}
}
