use std::{fmt::Display, str::FromStr};

use common::grid::Param;
use eyre::{Context, Result, bail, eyre};

/// Parses a scalar token or a bracketed, comma separated list such as `[1, 2, 4]`.
pub fn parse_param<T>(field: &str, raw: &str) -> Result<Param<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let parse = |token: &str| -> Result<T> {
        token
            .parse::<T>()
            .map_err(|e| eyre!("{e}"))
            .context(format!("Invalid value '{token}' for {field}"))
    };

    let raw = raw.trim();
    if !raw.contains('[') {
        return Ok(Param::Scalar(parse(raw)?));
    }

    let Some(inner) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) else {
        bail!("Malformed list for {field}: {raw}");
    };
    if inner.trim().is_empty() {
        return Ok(Param::Sweep(Vec::new()));
    }
    inner
        .split(',')
        .map(|token| parse(token.trim()))
        .collect::<Result<Vec<_>>>()
        .map(Param::Sweep)
}

fn check_all<T: Copy + Display>(
    field: &str,
    param: &Param<T>,
    valid: impl Fn(T) -> bool,
    range: &str,
) -> Result<()> {
    let values = match param {
        Param::Scalar(value) => std::slice::from_ref(value),
        Param::Sweep(values) => values.as_slice(),
    };
    if let Some(bad) = values.iter().find(|v| !valid(**v)) {
        bail!("{field} must be {range}, got {bad}");
    }
    Ok(())
}

pub fn parse_zipfians(raw: &str) -> Result<Param<f64>> {
    let param = parse_param("zipfians", raw)?;
    check_all("zipfians", &param, |z| (0.0..1.0).contains(&z), "in [0, 1)")?;
    Ok(param)
}

pub fn parse_ratios(raw: &str) -> Result<Param<u32>> {
    let param = parse_param("ratios", raw)?;
    check_all("ratios", &param, |u| u <= 100, "between 0 and 100")?;
    Ok(param)
}

pub fn parse_threads(raw: &str) -> Result<Param<usize>> {
    let param = parse_param("threads", raw)?;
    check_all("threads", &param, |p| p > 0, "at least 1")?;
    Ok(param)
}
