use std::cmp::Ordering;

use crate::runtime::{
    error::{EvalError, EvalResult},
    value::Value,
};

use super::helpers::{arg_count, arg_function, arg_list, arg_number, type_error};

pub(super) fn builtin_list(args: &[Value]) -> EvalResult<Value> {
    Ok(Value::list(args.to_vec()))
}

pub(super) fn builtin_cons(args: &[Value]) -> EvalResult<Value> {
    let rest = arg_list(args, 1, "cons", "rest")?;
    let mut items = Vec::with_capacity(rest.len() + 1);
    items.push(args[0].clone());
    items.extend(rest.iter().cloned());
    Ok(Value::list(items))
}

pub(super) fn builtin_first(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "first", "list")?;
    list.first()
        .cloned()
        .ok_or_else(|| EvalError::EmptyList("first".to_string()))
}

pub(super) fn builtin_rest(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "rest", "list")?;
    if list.is_empty() {
        return Err(EvalError::EmptyList("rest".to_string()));
    }
    Ok(Value::list(list[1..].to_vec()))
}

pub(super) fn builtin_is_empty(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "empty?", "list")?;
    Ok(Value::from_bool(list.is_empty()))
}

pub(super) fn builtin_len(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "len", "list")?;
    Ok(Value::Number(list.len() as f64))
}

pub(super) fn builtin_append(args: &[Value]) -> EvalResult<Value> {
    let a = arg_list(args, 0, "append", "first list")?;
    let b = arg_list(args, 1, "append", "second list")?;
    let mut items = Vec::with_capacity(a.len() + b.len());
    items.extend(a.iter().cloned());
    items.extend(b.iter().cloned());
    Ok(Value::list(items))
}

pub(super) fn builtin_take(args: &[Value]) -> EvalResult<Value> {
    let amount = arg_count(args, 0, "take", "amount")?;
    let list = arg_list(args, 1, "take", "list")?;
    Ok(Value::list(list.iter().take(amount).cloned().collect()))
}

pub(super) fn builtin_drop(args: &[Value]) -> EvalResult<Value> {
    let amount = arg_count(args, 0, "drop", "amount")?;
    let list = arg_list(args, 1, "drop", "list")?;
    Ok(Value::list(list.iter().skip(amount).cloned().collect()))
}

pub(super) fn builtin_get(args: &[Value]) -> EvalResult<Value> {
    let index = arg_number(args, 0, "get", "index")?;
    let list = arg_list(args, 1, "get", "list")?;
    if !index.is_finite() || index < 0.0 || index as usize >= list.len() {
        return Err(EvalError::IndexOutOfRange {
            name: "get".to_string(),
            index: index as i64,
            len: list.len(),
        });
    }
    Ok(list[index as usize].clone())
}

pub(super) fn builtin_reverse(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "reverse", "list")?;
    Ok(Value::list(list.iter().rev().cloned().collect()))
}

/// Orders two sort keys; only numbers with numbers and strings with strings.
fn compare_keys(name: &str, a: &Value, b: &Value) -> EvalResult<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(x.partial_cmp(y).unwrap_or(Ordering::Equal)),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Number(_), other) => Err(type_error(name, "element", "Number", other)),
        (Value::String(_), other) => Err(type_error(name, "element", "String", other)),
        (other, _) => Err(type_error(name, "element", "Number or String", other)),
    }
}

/// Stable merge of already-computed keys; sorting closures cannot return errors,
/// so comparisons are validated up front.
fn sort_by_keys(name: &str, items: &[Value], keys: Vec<Value>) -> EvalResult<Value> {
    for pair in keys.windows(2) {
        compare_keys(name, &pair[0], &pair[1])?;
    }
    let mut indexed: Vec<(Value, Value)> = keys.into_iter().zip(items.iter().cloned()).collect();
    indexed.sort_by(|(a, _), (b, _)| compare_keys(name, a, b).unwrap_or(Ordering::Equal));
    Ok(Value::list(indexed.into_iter().map(|(_, v)| v).collect()))
}

pub(super) fn builtin_sort(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "sort", "list")?;
    sort_by_keys("sort", list, list.to_vec())
}

pub(super) fn builtin_sort_by(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "sort-by", "list")?;
    let key = arg_function(args, 1, "sort-by", "key mapper")?;
    let keys = list
        .iter()
        .map(|item| key.call(std::slice::from_ref(item)))
        .collect::<EvalResult<Vec<_>>>()?;
    sort_by_keys("sort-by", list, keys)
}

/// Insertion sort driven by a user comparator returning a number
/// (negative, zero, positive); the comparator may fail so no std sort is used.
pub(super) fn builtin_sort_with(args: &[Value]) -> EvalResult<Value> {
    let list = arg_list(args, 0, "sort-with", "list")?;
    let comparator = arg_function(args, 1, "sort-with", "comparator")?;
    let mut sorted: Vec<Value> = Vec::with_capacity(list.len());
    for item in list.iter() {
        let mut at = sorted.len();
        while at > 0 {
            let order = comparator
                .call(&[sorted[at - 1].clone(), item.clone()])?
                .as_number("sort-with comparator result")?;
            if order <= 0.0 {
                break;
            }
            at -= 1;
        }
        sorted.insert(at, item.clone());
    }
    Ok(Value::list(sorted))
}

/// `(map f l1 l2 ...)` zips the lists and stops at the shortest one.
pub(super) fn builtin_map(args: &[Value]) -> EvalResult<Value> {
    let f = arg_function(args, 0, "map", "procedure")?;
    let lists = (1..args.len())
        .map(|i| arg_list(args, i, "map", "sequence"))
        .collect::<EvalResult<Vec<_>>>()?;
    let len = lists.iter().map(|l| l.len()).min().unwrap_or(0);
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let row: Vec<Value> = lists.iter().map(|l| l[i].clone()).collect();
        out.push(f.call(&row)?);
    }
    Ok(Value::list(out))
}

/// `(foldl f seed seq)` calls `f(element, accumulator)` left to right.
pub(super) fn builtin_foldl(args: &[Value]) -> EvalResult<Value> {
    let f = arg_function(args, 0, "foldl", "reductor")?;
    let seq = arg_list(args, 2, "foldl", "sequence")?;
    let mut acc = args[1].clone();
    for item in seq.iter() {
        acc = f.call(&[item.clone(), acc])?;
    }
    Ok(acc)
}

pub(super) fn builtin_filter(args: &[Value]) -> EvalResult<Value> {
    let predicate = arg_function(args, 0, "filter", "predicate")?;
    let seq = arg_list(args, 1, "filter", "sequence")?;
    let mut out = Vec::new();
    for item in seq.iter() {
        if predicate
            .call(std::slice::from_ref(item))?
            .is_truthy("filter predicate result")?
        {
            out.push(item.clone());
        }
    }
    Ok(Value::list(out))
}

/// `(build-list start end step)`, inclusive of `end`.
pub(super) fn builtin_build_list(args: &[Value]) -> EvalResult<Value> {
    let start = arg_number(args, 0, "build-list", "start")?;
    let end = arg_number(args, 1, "build-list", "end")?;
    let step = arg_number(args, 2, "build-list", "step")?;
    if !start.is_finite() || !end.is_finite() {
        return Err(EvalError::Native(format!(
            "build-list expected finite bounds, got {} and {}",
            start, end
        )));
    }
    if step <= 0.0 || !step.is_finite() {
        return Err(EvalError::Native(format!(
            "build-list expected a positive step, got {}",
            step
        )));
    }
    let mut out = Vec::new();
    let mut i = 0.0;
    loop {
        let value = if start <= end { start + i * step } else { start - i * step };
        if (start <= end && value > end) || (start > end && value < end) {
            break;
        }
        out.push(Value::Number(value));
        i += 1.0;
    }
    Ok(Value::list(out))
}

/// `(cartesian-product f l1 l2 ...)`: `f` applied to every combination, the
/// first list varying slowest.
pub(super) fn builtin_cartesian_product(args: &[Value]) -> EvalResult<Value> {
    let f = arg_function(args, 0, "cartesian-product", "combinator")?;
    let lists = (1..args.len())
        .map(|i| arg_list(args, i, "cartesian-product", "sequence"))
        .collect::<EvalResult<Vec<_>>>()?;
    let mut rows: Vec<Vec<Value>> = vec![Vec::new()];
    for list in &lists {
        let mut next = Vec::with_capacity(rows.len() * list.len());
        for row in &rows {
            for item in list.iter() {
                let mut extended = row.clone();
                extended.push(item.clone());
                next.push(extended);
            }
        }
        rows = next;
    }
    let out = rows
        .iter()
        .map(|row| f.call(row))
        .collect::<EvalResult<Vec<_>>>()?;
    Ok(Value::list(out))
}
