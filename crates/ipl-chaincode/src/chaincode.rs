use ipl_blob::BlobStore;
use ipl_ledger::StateStore;
use tracing::{error, info};

use crate::error::{ChaincodeError, ChaincodeResult};
use crate::operation::{check_arity, Invocation, Operation};
use crate::response::Response;
use crate::service::AssetService;

/// The surface a hosting runtime calls, once per transaction.
pub trait Chaincode: Send + Sync {
    /// One-time setup. Receives the raw argument list.
    fn init(&self, stub: &dyn StateStore, args: &[String]) -> Response;

    /// Route an invocation to an operation.
    fn invoke(&self, stub: &dyn StateStore, invocation: &Invocation) -> Response;
}

/// Route `invocation` to the matching [`AssetService`] operation.
pub fn dispatch<B: BlobStore>(
    service: &AssetService<B>,
    stub: &dyn StateStore,
    invocation: &Invocation,
) -> ChaincodeResult<String> {
    let args = &invocation.args;
    match invocation.operation()? {
        Operation::Set => service.set(stub, args),
        Operation::Get => service.get(stub, args),
        Operation::SetAddIpfs => service.set_addipfs(stub, args),
        Operation::GetCatIpfs => service.get_catipfs(stub, args),
    }
}

impl<B: BlobStore> Chaincode for AssetService<B> {
    fn init(&self, stub: &dyn StateStore, args: &[String]) -> Response {
        let _span = self.span().clone().entered();
        let result = check_arity(args, 2, "Expecting a key and a value").and_then(|()| {
            let (key, value) = (&args[0], &args[1]);
            stub.put_state(key, value.as_bytes())
                .map_err(|e| ChaincodeError::storage(format!("Failed to create asset: {key}"), e))
        });
        match result {
            Ok(()) => {
                info!(key = %args[0], "asset initialized");
                Response::success(Vec::new())
            }
            Err(e) => {
                error!(kind = %e.kind(), error = %e, "init failed");
                e.into()
            }
        }
    }

    fn invoke(&self, stub: &dyn StateStore, invocation: &Invocation) -> Response {
        let _span = self.span().clone().entered();
        let result = dispatch(self, stub, invocation);
        if let Err(e) = &result {
            error!(
                function = %invocation.function,
                kind = %e.kind(),
                error = %e,
                "invoke failed"
            );
        }
        result.into()
    }
}
