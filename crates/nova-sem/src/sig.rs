use nova_par::Type;
use rustc_hash::FxHashMap;

/// Nova's calling convention has six integer argument registers; a call
/// with more arguments than that has nowhere to go.
pub const MAX_PARAMS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSig {
    pub params: Vec<Type>,
    pub return_type: Type,
}

/// `print` is the only built-in, overloaded on its single argument's type.
pub fn builtin_signatures() -> FxHashMap<String, Vec<FunctionSig>> {
    let mut map = FxHashMap::default();
    map.insert(
        "print".to_string(),
        vec![
            FunctionSig {
                params: vec![Type::Int],
                return_type: Type::Void,
            },
            FunctionSig {
                params: vec![Type::String],
                return_type: Type::Void,
            },
        ],
    );
    map
}
