//! A single contract: its interface description and deployed address.

use std::path::Path;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::primitives::{Address, Bytes};

use crate::contract::types::{RegistryError, RegistryResult};

/// Interface description plus deployed address of one named contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    name: String,
    abi: JsonAbi,
    address: Address,
}

impl Contract {
    pub fn new(name: impl Into<String>, abi: JsonAbi, address: Address) -> Self {
        Self {
            name: name.into(),
            abi,
            address,
        }
    }

    /// Read a JSON interface description from `path`.
    pub fn from_abi_file(name: impl Into<String>, path: &Path, address: Address) -> RegistryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let abi: JsonAbi = serde_json::from_str(&content)?;
        Ok(Self::new(name, abi, address))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Encode a call to `function` (selector + arguments).
    ///
    /// Overloads are resolved by argument count. An empty function name
    /// encodes constructor arguments instead, without a selector.
    pub fn pack(&self, function: &str, args: &[DynSolValue]) -> RegistryResult<Bytes> {
        if function.is_empty() {
            return self.pack_constructor(args);
        }

        let func = self.overload(function, args.len())?;
        func.abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| RegistryError::AbiEncode(format!("{}.{}: {}", self.name, function, e)))
    }

    /// Decode the return data of `function`.
    pub fn unpack(&self, function: &str, data: &[u8]) -> RegistryResult<Vec<DynSolValue>> {
        if data.is_empty() {
            return Err(RegistryError::EmptyResponse);
        }

        let func = self
            .abi
            .function(function)
            .and_then(|overloads| overloads.first())
            .ok_or_else(|| self.function_not_found(function))?;

        func.abi_decode_output(data)
            .map_err(|e| RegistryError::AbiDecode(format!("{}.{}: {}", self.name, function, e)))
    }

    /// Init code for a deployment: `bytecode ++ encoded constructor arguments`.
    pub fn deploy(&self, bytecode: &[u8], args: &[DynSolValue]) -> RegistryResult<Bytes> {
        let encoded = self.pack_constructor(args)?;
        let mut init_code = Vec::with_capacity(bytecode.len() + encoded.len());
        init_code.extend_from_slice(bytecode);
        init_code.extend_from_slice(&encoded);
        Ok(init_code.into())
    }

    fn pack_constructor(&self, args: &[DynSolValue]) -> RegistryResult<Bytes> {
        match self.abi.constructor() {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map(Bytes::from)
                .map_err(|e| RegistryError::AbiEncode(format!("{} constructor: {}", self.name, e))),
            None if args.is_empty() => Ok(Bytes::new()),
            None => Err(RegistryError::AbiEncode(format!(
                "{} has no constructor but {} arguments were given",
                self.name,
                args.len()
            ))),
        }
    }

    fn overload(&self, function: &str, arity: usize) -> RegistryResult<&Function> {
        let overloads = self
            .abi
            .function(function)
            .ok_or_else(|| self.function_not_found(function))?;

        overloads
            .iter()
            .find(|func| func.inputs.len() == arity)
            .ok_or_else(|| {
                RegistryError::AbiEncode(format!(
                    "{}.{}: no overload takes {} arguments",
                    self.name, function, arity
                ))
            })
    }

    fn function_not_found(&self, function: &str) -> RegistryError {
        RegistryError::FunctionNotFound {
            contract: self.name.clone(),
            function: function.to_string(),
        }
    }
}
