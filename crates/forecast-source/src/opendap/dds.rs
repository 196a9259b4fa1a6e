use crate::error::{SourceError, SourceResult};

/// One array declaration from a DDS document.
#[derive(Debug, Clone, PartialEq)]
pub struct DdsVariable {
    pub name: String,
    pub data_type: String,
    /// `(dimension name, length)` in declaration order.
    pub dims: Vec<(String, usize)>,
}

impl DdsVariable {
    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dims.iter().find(|(d, _)| d == name).map(|(_, n)| *n)
    }
}

const DATA_TYPES: &[&str] = &[
    "Byte", "Int16", "UInt16", "Int32", "UInt32", "Float32", "Float64", "String",
];

/// Parse a DDS document into its array declarations.
///
/// Grid map vectors repeat the coordinate declarations; only the first
/// declaration of each name is kept.
pub fn parse_dds(body: &str) -> SourceResult<Vec<DdsVariable>> {
    super::check_error_document(body)?;

    if !body.trim_start().starts_with("Dataset") {
        return Err(SourceError::InvalidFormat(
            "DDS does not start with 'Dataset'".to_string(),
        ));
    }

    let mut variables: Vec<DdsVariable> = Vec::new();
    for line in body.lines() {
        let Some(variable) = parse_declaration(line.trim())? else {
            continue;
        };
        if !variables.iter().any(|v| v.name == variable.name) {
            variables.push(variable);
        }
    }

    if variables.is_empty() {
        return Err(SourceError::InvalidFormat(
            "DDS declares no variables".to_string(),
        ));
    }
    Ok(variables)
}

/// `Float32 tmp2m[time = 129][lat = 721][lon = 1440];`
fn parse_declaration(line: &str) -> SourceResult<Option<DdsVariable>> {
    let Some((data_type, rest)) = line.split_once(char::is_whitespace) else {
        return Ok(None);
    };
    if !DATA_TYPES.contains(&data_type) {
        return Ok(None);
    }

    let rest = rest.trim().trim_end_matches(';');
    let (name, dims_part) = match rest.find('[') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let mut dims = Vec::new();
    for dim in dims_part.split('[').filter(|d| !d.is_empty()) {
        let dim = dim.trim_end_matches(']');
        let (dim_name, len) = dim
            .split_once('=')
            .ok_or_else(|| SourceError::InvalidFormat(format!("bad dimension '{}'", dim)))?;
        let len = len
            .trim()
            .parse::<usize>()
            .map_err(|_| SourceError::InvalidFormat(format!("bad dimension length '{}'", dim)))?;
        dims.push((dim_name.trim().to_string(), len));
    }

    Ok(Some(DdsVariable {
        name: name.trim().to_string(),
        data_type: data_type.to_string(),
        dims,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fixture_dds() {
        let vars = parse_dds(test_utils::opendap::DDS).unwrap();
        let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["time", "lat", "lon", "tmp2m", "pratesfc"]);

        let tmp = &vars[3];
        assert_eq!(tmp.data_type, "Float32");
        assert_eq!(tmp.dim_len("time"), Some(3));
        assert_eq!(tmp.dim_len("lat"), Some(5));
        assert_eq!(tmp.dim_len("lon"), Some(4));
    }

    #[test]
    fn test_rejects_non_dds() {
        assert!(matches!(
            parse_dds("<p>maintenance</p>"),
            Err(SourceError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_bad_dimension() {
        let body = "Dataset {\n    Float32 x[time = many];\n} d;";
        assert!(parse_dds(body).is_err());
    }
}
