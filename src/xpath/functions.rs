//! XPath 1.0 Functions
//!
//! Node set: position(), last(), count(), local-name(), name()
//!
//! String: string(), concat(), starts-with(), contains(), substring(),
//! substring-before(), substring-after(), string-length(),
//! normalize-space(), translate()
//!
//! Boolean: boolean(), not(), true(), false()
//!
//! Number: number(), sum(), floor(), ceiling(), round()

use super::eval::EvalContext;
use super::value::{parse_number, XPathValue};

/// Evaluate a function call
pub fn call(name: &str, args: Vec<XPathValue>, ctx: &EvalContext<'_>) -> Result<XPathValue, String> {
    match name {
        "position" => no_args(name, &args).map(|_| XPathValue::Number(ctx.position as f64)),
        "last" => no_args(name, &args).map(|_| XPathValue::Number(ctx.size as f64)),
        "count" => fn_count(&args),
        "local-name" => fn_name(&args, ctx, true),
        "name" => fn_name(&args, ctx, false),

        "string" => {
            arity(name, &args, 0, 1)?;
            Ok(XPathValue::String(string_arg(&args, 0, ctx)))
        }
        "concat" => {
            if args.len() < 2 {
                return Err("concat() requires at least 2 arguments".to_string());
            }
            Ok(XPathValue::String(
                args.iter().map(|a| a.to_string_value(ctx.doc)).collect(),
            ))
        }
        "starts-with" => {
            let (s, prefix) = two_strings(name, &args, ctx)?;
            Ok(XPathValue::Boolean(s.starts_with(&prefix)))
        }
        "contains" => {
            let (s, pattern) = two_strings(name, &args, ctx)?;
            Ok(XPathValue::Boolean(s.contains(&pattern)))
        }
        "substring" => fn_substring(&args, ctx),
        "substring-before" => {
            let (s, pattern) = two_strings(name, &args, ctx)?;
            let before = s.find(&pattern).map(|pos| &s[..pos]).unwrap_or("");
            Ok(XPathValue::String(before.to_string()))
        }
        "substring-after" => {
            let (s, pattern) = two_strings(name, &args, ctx)?;
            let after = s
                .find(&pattern)
                .map(|pos| &s[pos + pattern.len()..])
                .unwrap_or("");
            Ok(XPathValue::String(after.to_string()))
        }
        "string-length" => {
            arity(name, &args, 0, 1)?;
            Ok(XPathValue::Number(string_arg(&args, 0, ctx).chars().count() as f64))
        }
        "normalize-space" => {
            arity(name, &args, 0, 1)?;
            let s = string_arg(&args, 0, ctx);
            Ok(XPathValue::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
        }
        "translate" => fn_translate(&args, ctx),

        "boolean" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(args[0].to_boolean()))
        }
        "not" => {
            arity(name, &args, 1, 1)?;
            Ok(XPathValue::Boolean(!args[0].to_boolean()))
        }
        "true" => no_args(name, &args).map(|_| XPathValue::Boolean(true)),
        "false" => no_args(name, &args).map(|_| XPathValue::Boolean(false)),

        "number" => {
            arity(name, &args, 0, 1)?;
            let n = match args.first() {
                Some(arg) => arg.to_number(ctx.doc),
                None => parse_number(&ctx.doc.string_value(ctx.node)),
            };
            Ok(XPathValue::Number(n))
        }
        "sum" => fn_sum(&args, ctx),
        "floor" => number_fn(name, &args, ctx, f64::floor),
        "ceiling" => number_fn(name, &args, ctx, f64::ceil),
        "round" => number_fn(name, &args, ctx, xpath_round),

        _ => Err(format!("Unknown function: {}", name)),
    }
}

fn arity(name: &str, args: &[XPathValue], min: usize, max: usize) -> Result<(), String> {
    if args.len() < min || args.len() > max {
        return Err(match (min, max) {
            (a, b) if a == b => format!("{}() requires exactly {} argument(s)", name, a),
            _ => format!("{}() requires {} to {} arguments", name, min, max),
        });
    }
    Ok(())
}

fn no_args(name: &str, args: &[XPathValue]) -> Result<(), String> {
    arity(name, args, 0, 0)
}

/// String value of argument `i`, or of the context node when omitted
fn string_arg(args: &[XPathValue], i: usize, ctx: &EvalContext<'_>) -> String {
    match args.get(i) {
        Some(arg) => arg.to_string_value(ctx.doc),
        None => ctx.doc.string_value(ctx.node),
    }
}

fn two_strings(
    name: &str,
    args: &[XPathValue],
    ctx: &EvalContext<'_>,
) -> Result<(String, String), String> {
    arity(name, args, 2, 2)?;
    Ok((args[0].to_string_value(ctx.doc), args[1].to_string_value(ctx.doc)))
}

fn number_fn(
    name: &str,
    args: &[XPathValue],
    ctx: &EvalContext<'_>,
    f: fn(f64) -> f64,
) -> Result<XPathValue, String> {
    arity(name, args, 1, 1)?;
    Ok(XPathValue::Number(f(args[0].to_number(ctx.doc))))
}

fn fn_count(args: &[XPathValue]) -> Result<XPathValue, String> {
    arity("count", args, 1, 1)?;
    match &args[0] {
        XPathValue::NodeSet(nodes) => Ok(XPathValue::Number(nodes.len() as f64)),
        XPathValue::AttrValues(values) => Ok(XPathValue::Number(values.len() as f64)),
        _ => Err("count() argument must be a node-set".to_string()),
    }
}

fn fn_name(args: &[XPathValue], ctx: &EvalContext<'_>, local: bool) -> Result<XPathValue, String> {
    let fname = if local { "local-name" } else { "name" };
    arity(fname, args, 0, 1)?;
    let node = match args.first() {
        None => Some(ctx.node),
        Some(XPathValue::NodeSet(nodes)) => nodes.first().copied(),
        Some(XPathValue::AttrValues(_)) => None,
        Some(_) => return Err(format!("{}() argument must be a node-set", fname)),
    };
    let name = node.and_then(|id| {
        if local {
            ctx.doc.node_local_name(id)
        } else {
            ctx.doc.node_name(id)
        }
    });
    Ok(XPathValue::String(name.unwrap_or("").to_string()))
}

fn fn_substring(args: &[XPathValue], ctx: &EvalContext<'_>) -> Result<XPathValue, String> {
    arity("substring", args, 2, 3)?;
    let s = args[0].to_string_value(ctx.doc);
    let start = xpath_round(args[1].to_number(ctx.doc));
    let end = match args.get(2) {
        Some(len) => start + xpath_round(len.to_number(ctx.doc)),
        None => f64::INFINITY,
    };
    // Character positions are 1-based; p is kept when start <= p < end
    let result = s
        .chars()
        .enumerate()
        .filter(|&(i, _)| {
            let p = (i + 1) as f64;
            p >= start && p < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XPathValue::String(result))
}

fn fn_translate(args: &[XPathValue], ctx: &EvalContext<'_>) -> Result<XPathValue, String> {
    arity("translate", args, 3, 3)?;
    let s = args[0].to_string_value(ctx.doc);
    let from: Vec<char> = args[1].to_string_value(ctx.doc).chars().collect();
    let to: Vec<char> = args[2].to_string_value(ctx.doc).chars().collect();

    let result = s
        .chars()
        .filter_map(|c| match from.iter().position(|&fc| fc == c) {
            Some(pos) => to.get(pos).copied(),
            None => Some(c),
        })
        .collect();
    Ok(XPathValue::String(result))
}

fn fn_sum(args: &[XPathValue], ctx: &EvalContext<'_>) -> Result<XPathValue, String> {
    arity("sum", args, 1, 1)?;
    let total: f64 = match &args[0] {
        XPathValue::NodeSet(nodes) => nodes
            .iter()
            .map(|&id| parse_number(&ctx.doc.string_value(id)))
            .sum(),
        XPathValue::AttrValues(values) => values.iter().map(|v| parse_number(v)).sum(),
        _ => return Err("sum() argument must be a node-set".to_string()),
    };
    Ok(XPathValue::Number(total))
}

/// Halves round towards positive infinity
fn xpath_round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}
