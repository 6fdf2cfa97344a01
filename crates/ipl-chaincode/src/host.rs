use ipl_ledger::{LedgerBackend, StateStore, Transaction};
use tracing::{debug, error};

use crate::chaincode::Chaincode;
use crate::error::ChaincodeError;
use crate::operation::Invocation;
use crate::response::Response;

/// Runs each call to a [`Chaincode`] inside its own ledger transaction.
///
/// Writes are committed only when the response is OK. A failed response
/// discards them, so no operation ever leaves a partial ledger update. Side
/// effects outside the ledger (blob uploads) are not undone either way.
pub struct ChaincodeHost<L, C> {
    ledger: L,
    chaincode: C,
}

impl<L: LedgerBackend, C: Chaincode> ChaincodeHost<L, C> {
    pub fn new(ledger: L, chaincode: C) -> Self {
        Self { ledger, chaincode }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn chaincode(&self) -> &C {
        &self.chaincode
    }

    pub fn init(&self, args: &[String]) -> Response {
        self.run(|stub| self.chaincode.init(stub, args))
    }

    pub fn invoke(&self, invocation: &Invocation) -> Response {
        self.run(|stub| self.chaincode.invoke(stub, invocation))
    }

    /// Invoke with a raw argument vector whose first element names the operation.
    pub fn invoke_args<I, S>(&self, raw: I) -> Response
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invoke(&Invocation::from_args(raw))
    }

    fn run(&self, call: impl FnOnce(&dyn StateStore) -> Response) -> Response {
        let tx = Transaction::new(&self.ledger);
        let response = call(&tx);
        if !response.is_ok() {
            let discarded = tx.abort();
            debug!(discarded, "call failed; transaction aborted");
            return response;
        }
        match tx.commit() {
            Ok(written) => {
                debug!(written, "transaction committed");
                response
            }
            Err(e) => {
                error!(error = %e, "commit failed");
                ChaincodeError::storage("Failed to commit transaction", e).into()
            }
        }
    }
}

impl<L: LedgerBackend, C: Chaincode> std::fmt::Debug for ChaincodeHost<L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChaincodeHost").finish_non_exhaustive()
    }
}
