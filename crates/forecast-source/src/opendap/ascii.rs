use crate::error::{SourceError, SourceResult};

/// One array from an `.ascii` response.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiArray {
    pub name: String,
    pub dims: Vec<usize>,
    /// Row-major values, `dims.iter().product()` of them.
    pub values: Vec<f64>,
}

/// Parse an `.ascii` response into its arrays.
///
/// Each array starts with a header `name, [d0][d1]...` followed by value
/// rows. Rows of multi-dimensional arrays carry an index prefix
/// (`[0][1], v, v, ...`) which is discarded.
pub fn parse_ascii(body: &str) -> SourceResult<Vec<AsciiArray>> {
    super::check_error_document(body)?;

    let mut arrays: Vec<AsciiArray> = Vec::new();
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((name, dims)) = parse_header(line)? {
            arrays.push(AsciiArray {
                name,
                dims,
                values: Vec::new(),
            });
            continue;
        }

        let current = arrays.last_mut().ok_or_else(|| {
            SourceError::InvalidFormat(format!("value row before any header: '{}'", line))
        })?;

        let row = if line.starts_with('[') {
            line.split_once(',').map(|(_, rest)| rest).unwrap_or("")
        } else {
            line
        };
        for token in row.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let value = token
                .parse::<f64>()
                .map_err(|_| SourceError::InvalidFormat(format!("bad value '{}'", token)))?;
            current.values.push(value);
        }
    }

    for array in &arrays {
        let expected: usize = array.dims.iter().product();
        if array.values.len() != expected {
            return Err(SourceError::InvalidFormat(format!(
                "{} declares {} values but {} were sent",
                array.name,
                expected,
                array.values.len()
            )));
        }
    }

    if arrays.is_empty() {
        return Err(SourceError::InvalidFormat("empty ASCII response".to_string()));
    }
    Ok(arrays)
}

/// `tmp2m, [1][3][2]` → `("tmp2m", [1, 3, 2])`. Value rows give `None`.
fn parse_header(line: &str) -> SourceResult<Option<(String, Vec<usize>)>> {
    let Some((name, dims)) = line.split_once(", [") else {
        return Ok(None);
    };
    let is_identifier = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !is_identifier {
        return Ok(None);
    }

    let dims = format!("[{}", dims)
        .split(']')
        .map(|d| d.trim().trim_start_matches('['))
        .filter(|d| !d.is_empty())
        .map(|d| {
            d.parse::<usize>()
                .map_err(|_| SourceError::InvalidFormat(format!("bad array header '{}'", line)))
        })
        .collect::<SourceResult<Vec<_>>>()?;

    Ok(Some((name.to_string(), dims)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_axes_response() {
        let arrays = parse_ascii(test_utils::opendap::AXES_ASCII).unwrap();
        assert_eq!(arrays.len(), 3);
        assert_eq!(arrays[0].name, "time");
        assert_eq!(arrays[0].values, vec![739446.0, 739446.125, 739446.25]);
        assert_eq!(arrays[1].dims, vec![5]);
        assert_eq!(arrays[2].values[3], 114.75);
    }

    #[test]
    fn test_parse_grid_response_strips_row_prefix() {
        let arrays = parse_ascii(test_utils::opendap::TMP2M_ASCII).unwrap();
        let tmp = &arrays[0];
        assert_eq!(tmp.name, "tmp2m");
        assert_eq!(tmp.dims, vec![1, 3, 2]);
        assert_eq!(tmp.values.len(), 6);
        assert_eq!(tmp.values[0], 300.5);
        assert!(tmp.values[2] > 1e20);
        assert_eq!(tmp.values[5], 303.5);
    }

    #[test]
    fn test_count_mismatch_is_format_error() {
        let body = "lat, [3]\n-1.0, 0.0\n";
        assert!(matches!(parse_ascii(body), Err(SourceError::InvalidFormat(_))));
    }

    #[test]
    fn test_rows_before_header_rejected() {
        assert!(parse_ascii("1.0, 2.0\n").is_err());
    }
}
