use crate::symbol::{Address, ConstructKind, Symbol};
use anyhow::{Context, bail};
use regex::Regex;

// kind:name, where name may contain anything except '/' and surrounding blanks.
const SYMBOL_RE: &str = r"^\s*([a-z_]+)\s*:\s*([^/\s](?:[^/]*[^/\s])?)\s*$";

/// Compile the symbol pattern once; callers pass it to every parse.
pub fn symbol_regex() -> anyhow::Result<Regex> {
    Ok(Regex::new(SYMBOL_RE)?)
}

/// Parse "agent:A/subsystem:S/terminus:out" into an Address.
pub fn parse_address(re: &Regex, s: &str) -> anyhow::Result<Address> {
    let s = s.trim();
    if s.is_empty() {
        bail!("address cannot be empty");
    }

    let mut path = Vec::new();
    for part in s.split('/') {
        path.push(parse_symbol(re, part).with_context(|| format!("bad address {:?}", s))?);
    }
    Ok(Address::new(path)?)
}

/// Parse "buffer:wm" into Symbol(Buffer, "wm").
pub fn parse_symbol(re: &Regex, s: &str) -> anyhow::Result<Symbol> {
    let caps = match re.captures(s) {
        Some(c) => c,
        None => bail!("symbol must look like kind:name, got {:?}", s),
    };

    let kind: ConstructKind = caps[1]
        .parse()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("bad symbol {:?}", s))?;

    Ok(Symbol::new(kind, &caps[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{agent, buffer, subsystem, terminus};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_symbols_with_spacing() {
        let re = symbol_regex().unwrap();
        assert_eq!(parse_symbol(&re, "buffer:wm").unwrap(), buffer("wm"));
        assert_eq!(parse_symbol(&re, "  terminus : main out ").unwrap(), terminus("main out"));
    }

    #[test]
    fn rejects_malformed_symbols() {
        let re = symbol_regex().unwrap();
        assert!(parse_symbol(&re, "wm").is_err());
        assert!(parse_symbol(&re, "pool:wm").is_err());
        assert!(parse_symbol(&re, "buffer:").is_err());
    }

    #[test]
    fn parses_addresses() {
        let re = symbol_regex().unwrap();
        let addr = parse_address(&re, "agent:A/subsystem:S/terminus:out").unwrap();
        assert_eq!(
            addr,
            Address::new(vec![agent("A"), subsystem("S"), terminus("out")]).unwrap()
        );
        assert!(parse_address(&re, "").is_err());
        assert!(parse_address(&re, "agent:A//buffer:wm").is_err());
    }
}
