use std::fmt;
use std::str::FromStr;

use crate::error::{ChaincodeError, ChaincodeResult};

/// The operations reachable through `invoke`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Set,
    Get,
    SetAddIpfs,
    GetCatIpfs,
}

impl Operation {
    pub const ALL: [Operation; 4] = [Self::Set, Self::Get, Self::SetAddIpfs, Self::GetCatIpfs];

    /// Wire name matched exactly by dispatch.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Get => "get",
            Self::SetAddIpfs => "set_addipfs",
            Self::GetCatIpfs => "get_catipfs",
        }
    }

    /// Required argument count, excluding the operation name.
    pub fn arity(&self) -> usize {
        match self {
            Self::Set | Self::SetAddIpfs => 2,
            Self::Get | Self::GetCatIpfs => 1,
        }
    }

    fn expectation(&self) -> &'static str {
        match self {
            Self::Set => "Expecting a key and a value",
            Self::Get => "Expecting a key",
            Self::SetAddIpfs => "Expecting a key and a sender|receiver|filename value",
            Self::GetCatIpfs => "Expecting a document number",
        }
    }

    /// Fail with [`ChaincodeError::Argument`] unless `args` has exactly
    /// [`arity`](Self::arity) elements.
    pub fn check_arity(&self, args: &[String]) -> ChaincodeResult<()> {
        check_arity(args, self.arity(), self.expectation())
    }
}

pub(crate) fn check_arity(
    args: &[String],
    arity: usize,
    expected: &'static str,
) -> ChaincodeResult<()> {
    if args.len() != arity {
        return Err(ChaincodeError::Argument {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

impl FromStr for Operation {
    type Err = ChaincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ChaincodeError::Dispatch {
                function: s.to_string(),
            })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One inbound call: an operation name and its string arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Invocation {
    pub function: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(function: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            function: function.into(),
            args,
        }
    }

    /// Split a raw argument vector into function name and parameters.
    ///
    /// An empty vector yields an empty function name, which dispatch rejects.
    pub fn from_args<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = raw.into_iter().map(Into::into);
        let function = iter.next().unwrap_or_default();
        Self {
            function,
            args: iter.collect(),
        }
    }

    /// Resolve the function name to an [`Operation`].
    pub fn operation(&self) -> ChaincodeResult<Operation> {
        self.function.parse()
    }
}
