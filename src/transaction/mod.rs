//! Transaction manager collaborator.
//!
//! The execution engine forwards BEGIN/COMMIT/ROLLBACK here and consumes no
//! return value. Rollback of partial mutations is this collaborator's
//! responsibility, not the engine's; the bundled implementation only tracks
//! whether a transaction is open.

pub trait TransactionManager: Send {
    fn begin(&mut self);
    fn commit(&mut self);
    fn rollback(&mut self);
}

/// Bookkeeping-only transaction manager.
#[derive(Debug, Default)]
pub struct LocalTransactionManager {
    active: bool,
}

impl LocalTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_transaction(&self) -> bool {
        self.active
    }
}

impl TransactionManager for LocalTransactionManager {
    fn begin(&mut self) {
        self.active = true;
    }

    fn commit(&mut self) {
        self.active = false;
    }

    fn rollback(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_commit_rollback_toggle_state() {
        let mut tx = LocalTransactionManager::new();
        assert!(!tx.in_transaction());

        tx.begin();
        assert!(tx.in_transaction());
        tx.commit();
        assert!(!tx.in_transaction());

        tx.begin();
        tx.rollback();
        assert!(!tx.in_transaction());
    }
}
