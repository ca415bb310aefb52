//! CSI parameter lists
//!
//! `1;2:3;;4` parses to four parameters; the second carries the colon
//! subparameter `3`. A missing or zero value means "use the default".

/// Parameters beyond this count are dropped.
pub const MAX_PARAMS: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: Vec<u16>,
    /// Colon-separated values following each parameter, parallel to `values`
    subparams: Vec<Vec<u16>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_slice(values: &[u16]) -> Self {
        Self {
            values: values.to_vec(),
            subparams: vec![Vec::new(); values.len()],
        }
    }

    /// Parse the raw parameter bytes collected between the CSI introducer
    /// and the final byte.
    pub fn parse(bytes: &[u8]) -> Self {
        let mut params = Self::new();
        if bytes.is_empty() {
            return params;
        }

        for group in bytes.split(|&b| b == b';') {
            if params.values.len() >= MAX_PARAMS {
                break;
            }
            let mut parts = group.split(|&b| b == b':').map(parse_number);
            let head = parts.next().unwrap_or(0);
            params.values.push(head);
            params.subparams.push(parts.collect());
        }

        params
    }

    /// Value at `index`, treating absent and zero alike as "not given".
    pub fn get(&self, index: usize) -> Option<u16> {
        self.values.get(index).copied().filter(|&v| v != 0)
    }

    pub fn get_or(&self, index: usize, default: u16) -> u16 {
        self.get(index).unwrap_or(default)
    }

    /// Value at `index` with zero kept as zero (SGR 0, ED 0, ...).
    pub fn raw(&self, index: usize) -> u16 {
        self.values.get(index).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn subparams(&self, index: usize) -> &[u16] {
        self.subparams.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.values.iter().copied()
    }
}

fn parse_number(digits: &[u8]) -> u16 {
    digits
        .iter()
        .filter(|b| b.is_ascii_digit())
        .fold(0u16, |acc, &b| acc.saturating_mul(10).saturating_add((b - b'0') as u16))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_empty() {
        let params = Params::parse(b"");
        assert!(params.is_empty());
        assert_eq!(params.get_or(0, 1), 1);
    }

    #[test]
    fn test_params_multiple() {
        let params = Params::parse(b"1;2;3");
        assert_eq!(params.len(), 3);
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_params_default() {
        let params = Params::parse(b";5;");
        assert_eq!(params.len(), 3);
        assert_eq!(params.get(0), None);
        assert_eq!(params.get(1), Some(5));
        assert_eq!(params.get(2), None);
        assert_eq!(params.get_or(0, 1), 1);
        assert_eq!(params.raw(0), 0);
    }

    #[test]
    fn test_params_overflow_saturates() {
        let params = Params::parse(b"99999");
        assert_eq!(params.get(0), Some(65535));
    }

    #[test]
    fn test_params_subparams() {
        let params = Params::parse(b"38:2:255:128:64;1");
        assert_eq!(params.len(), 2);
        assert_eq!(params.raw(0), 38);
        assert_eq!(params.subparams(0), &[2, 255, 128, 64]);
        assert_eq!(params.raw(1), 1);
        assert!(params.subparams(1).is_empty());
    }

    #[test]
    fn test_params_capped() {
        let raw = vec!["1"; MAX_PARAMS + 10].join(";");
        let params = Params::parse(raw.as_bytes());
        assert_eq!(params.len(), MAX_PARAMS);
    }
}
