//! ABI encoding of method calls and deployments

use crate::error::{PipelineResult, UsageError};

use ethers::abi::token::{LenientTokenizer, Tokenizer};
use ethers::abi::{Abi, Function, Param, ParamType, Token};
use ethers::types::Bytes;
use serde_json::Value;

/// Encodes calls against a contract ABI
#[derive(Debug, Clone)]
pub struct ContractProxy {
    abi: Abi,
}

impl ContractProxy {
    pub fn new(abi: Abi) -> Self {
        Self { abi }
    }

    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Encode `method(args...)` as call data
    pub fn encode_call(&self, method: &str, args: &[Value]) -> PipelineResult<Bytes> {
        let function = self.select_function(method, args.len())?;
        let tokens = tokenize_params(&function.inputs, args)?;

        let data = function
            .encode_input(&tokens)
            .map_err(|e| UsageError::InvalidArgument {
                index: 0,
                param_type: function.signature(),
                message: e.to_string(),
            })?;
        Ok(data.into())
    }

    /// Encode creation code: bytecode followed by the constructor arguments
    pub fn encode_deployment(&self, bytecode: &Bytes, args: &[Value]) -> PipelineResult<Bytes> {
        let Some(constructor) = self.abi.constructor() else {
            if !args.is_empty() {
                return Err(UsageError::UnexpectedConstructorArgs { got: args.len() }.into());
            }
            return Ok(bytecode.clone());
        };

        let tokens = tokenize_params(&constructor.inputs, args)?;
        let data = constructor
            .encode_input(bytecode.to_vec(), &tokens)
            .map_err(|e| UsageError::InvalidArgument {
                index: 0,
                param_type: "constructor".to_string(),
                message: e.to_string(),
            })?;
        Ok(data.into())
    }

    /// Find the method, preferring the overload whose arity matches
    fn select_function(&self, method: &str, arity: usize) -> Result<&Function, UsageError> {
        let overloads = self
            .abi
            .functions_by_name(method)
            .map_err(|_| UsageError::UnknownMethod {
                name: method.to_string(),
            })?;

        overloads
            .iter()
            .find(|f| f.inputs.len() == arity)
            .or_else(|| overloads.first())
            .ok_or_else(|| UsageError::UnknownMethod {
                name: method.to_string(),
            })
    }
}

fn tokenize_params(params: &[Param], args: &[Value]) -> Result<Vec<Token>, UsageError> {
    if params.len() != args.len() {
        return Err(UsageError::ArgumentCount {
            expected: params.len(),
            got: args.len(),
        });
    }

    params
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, value))| {
            tokenize(&param.kind, value).map_err(|message| UsageError::InvalidArgument {
                index,
                param_type: param.kind.to_string(),
                message,
            })
        })
        .collect()
}

/// Convert a JSON value into a token of the given ABI type
fn tokenize(kind: &ParamType, value: &Value) -> Result<Token, String> {
    match (kind, value) {
        (ParamType::Array(inner), Value::Array(items)) => items
            .iter()
            .map(|item| tokenize(inner, item))
            .collect::<Result<_, _>>()
            .map(Token::Array),
        (ParamType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(format!("expected {} elements, got {}", len, items.len()));
            }
            items
                .iter()
                .map(|item| tokenize(inner, item))
                .collect::<Result<_, _>>()
                .map(Token::FixedArray)
        }
        (ParamType::Tuple(kinds), Value::Array(items)) => {
            if items.len() != kinds.len() {
                return Err(format!(
                    "expected {} tuple fields, got {}",
                    kinds.len(),
                    items.len()
                ));
            }
            kinds
                .iter()
                .zip(items)
                .map(|(kind, item)| tokenize(kind, item))
                .collect::<Result<_, _>>()
                .map(Token::Tuple)
        }
        (_, Value::String(s)) => lenient(kind, s),
        (_, Value::Number(n)) => lenient(kind, &n.to_string()),
        (_, Value::Bool(b)) => lenient(kind, &b.to_string()),
        (_, other) => Err(format!("unsupported value {}", other)),
    }
}

fn lenient(kind: &ParamType, value: &str) -> Result<Token, String> {
    LenientTokenizer::tokenize(kind, value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use ethers::abi::encode;
    use ethers::types::U256;
    use ethers::utils::id;
    use serde_json::json;

    fn abi() -> Abi {
        serde_json::from_value(json!([
            {"type":"constructor","inputs":[{"name":"supply","type":"uint256"}],"stateMutability":"nonpayable"},
            {"type":"function","name":"foo","inputs":[],"outputs":[],"stateMutability":"nonpayable"},
            {"type":"function","name":"set","inputs":[{"name":"value","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"},
            {"type":"function","name":"set","inputs":[{"name":"value","type":"uint256"},{"name":"flag","type":"bool"}],"outputs":[],"stateMutability":"nonpayable"},
            {"type":"function","name":"batch","inputs":[{"name":"values","type":"uint256[]"}],"outputs":[],"stateMutability":"nonpayable"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_encode_no_arg_call() {
        let data = ContractProxy::new(abi()).encode_call("foo", &[]).unwrap();
        assert_eq!(data.to_vec(), id("foo()").to_vec());
    }

    #[test]
    fn test_encode_picks_overload_by_arity() {
        let proxy = ContractProxy::new(abi());

        let data = proxy.encode_call("set", &[json!(42)]).unwrap();
        let mut expected = id("set(uint256)").to_vec();
        expected.extend(encode(&[Token::Uint(U256::from(42))]));
        assert_eq!(data.to_vec(), expected);

        let data = proxy.encode_call("set", &[json!("1000"), json!(true)]).unwrap();
        let mut expected = id("set(uint256,bool)").to_vec();
        expected.extend(encode(&[Token::Uint(U256::from(1000)), Token::Bool(true)]));
        assert_eq!(data.to_vec(), expected);
    }

    #[test]
    fn test_encode_array_argument() {
        let data = ContractProxy::new(abi())
            .encode_call("batch", &[json!([1, "2", 3])])
            .unwrap();
        let mut expected = id("batch(uint256[])").to_vec();
        expected.extend(encode(&[Token::Array(vec![
            Token::Uint(U256::from(1)),
            Token::Uint(U256::from(2)),
            Token::Uint(U256::from(3)),
        ])]));
        assert_eq!(data.to_vec(), expected);
    }

    #[test]
    fn test_unknown_method() {
        let err = ContractProxy::new(abi()).encode_call("bar", &[]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Usage(UsageError::UnknownMethod { ref name }) if name == "bar"
        ));
    }

    #[test]
    fn test_argument_count_mismatch() {
        let err = ContractProxy::new(abi())
            .encode_call("foo", &[json!(1)])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Usage(UsageError::ArgumentCount { expected: 0, got: 1 })
        ));
    }

    #[test]
    fn test_invalid_argument_value() {
        let err = ContractProxy::new(abi())
            .encode_call("set", &[json!("not a number")])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Usage(UsageError::InvalidArgument { index: 0, .. })
        ));
    }

    #[test]
    fn test_encode_deployment_appends_constructor_args() {
        let bytecode = Bytes::from(vec![0x60, 0x80, 0x60, 0x40]);
        let data = ContractProxy::new(abi())
            .encode_deployment(&bytecode, &[json!(7)])
            .unwrap();

        let mut expected = bytecode.to_vec();
        expected.extend(encode(&[Token::Uint(U256::from(7))]));
        assert_eq!(data.to_vec(), expected);
    }

    #[test]
    fn test_deployment_without_constructor() {
        let abi: Abi = serde_json::from_value(json!([])).unwrap();
        let proxy = ContractProxy::new(abi);
        let bytecode = Bytes::from(vec![0x60, 0x80]);

        assert_eq!(proxy.encode_deployment(&bytecode, &[]).unwrap(), bytecode);
        let err = proxy.encode_deployment(&bytecode, &[json!(1)]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Usage(UsageError::UnexpectedConstructorArgs { got: 1 })
        ));
    }
}
