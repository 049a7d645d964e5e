use crate::runtime::{
    BuiltinFn,
    environment::Environment,
    native_function::{Arity, NativeFunction},
    value::Value,
};

mod helpers;
mod list_ops;
mod logic_ops;
mod numeric_ops;
mod string_ops;

use list_ops::{
    builtin_append, builtin_build_list, builtin_cartesian_product, builtin_cons, builtin_drop,
    builtin_filter, builtin_first, builtin_foldl, builtin_get, builtin_is_empty, builtin_len,
    builtin_list, builtin_map, builtin_rest, builtin_reverse, builtin_sort, builtin_sort_by,
    builtin_sort_with, builtin_take,
};
use logic_ops::{builtin_and, builtin_identity, builtin_not, builtin_or, builtin_xor};
use numeric_ops::{
    builtin_add, builtin_div, builtin_eq, builtin_ge, builtin_gt, builtin_le, builtin_lt,
    builtin_mod, builtin_mul, builtin_pow, builtin_sub,
};
use string_ops::{builtin_concat_strings, builtin_num_to_string, builtin_string_to_num};

pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

const fn exact(name: &'static str, n: usize, func: BuiltinFn) -> Builtin {
    Builtin {
        name,
        arity: Arity::Exact(n),
        func,
    }
}

const fn at_least(name: &'static str, n: usize, func: BuiltinFn) -> Builtin {
    Builtin {
        name,
        arity: Arity::AtLeast(n),
        func,
    }
}

/// Every builtin bound in the global environment, under the symbols graph
/// nodes call by name.
pub static BUILTINS: &[Builtin] = &[
    at_least("+", 2, builtin_add),
    exact("-", 2, builtin_sub),
    at_least("*", 2, builtin_mul),
    exact("/", 2, builtin_div),
    exact("%", 2, builtin_mod),
    exact("pow", 2, builtin_pow),
    exact("<", 2, builtin_lt),
    exact("<=", 2, builtin_le),
    exact(">", 2, builtin_gt),
    exact(">=", 2, builtin_ge),
    exact("=", 2, builtin_eq),
    exact("and", 2, builtin_and),
    exact("or", 2, builtin_or),
    exact("xor", 2, builtin_xor),
    exact("not", 1, builtin_not),
    exact("identity", 1, builtin_identity),
    at_least("list", 0, builtin_list),
    exact("cons", 2, builtin_cons),
    exact("first", 1, builtin_first),
    exact("rest", 1, builtin_rest),
    exact("empty?", 1, builtin_is_empty),
    exact("len", 1, builtin_len),
    exact("append", 2, builtin_append),
    exact("take", 2, builtin_take),
    exact("drop", 2, builtin_drop),
    exact("get", 2, builtin_get),
    exact("reverse", 1, builtin_reverse),
    exact("sort", 1, builtin_sort),
    exact("sort-by", 2, builtin_sort_by),
    exact("sort-with", 2, builtin_sort_with),
    at_least("map", 2, builtin_map),
    exact("foldl", 3, builtin_foldl),
    exact("filter", 2, builtin_filter),
    exact("build-list", 3, builtin_build_list),
    at_least("cartesian-product", 2, builtin_cartesian_product),
    at_least("concat-strings", 1, builtin_concat_strings),
    exact("string->num", 1, builtin_string_to_num),
    exact("num->string", 1, builtin_num_to_string),
];

pub fn get_builtin(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

impl Builtin {
    pub fn to_function(&self) -> NativeFunction {
        NativeFunction::new(self.name, self.arity, self.func)
    }
}

/// Binds every builtin plus the `empty` list constant.
pub fn install(env: &Environment) {
    for builtin in BUILTINS {
        env.define(builtin.name, Value::Function(builtin.to_function()));
    }
    env.define("empty", Value::empty_list());
}
