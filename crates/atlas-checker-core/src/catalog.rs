use std::collections::HashSet;
use std::path::Path;

use crate::error::{Error, Result};

/// Value domain shared by catalog identifiers and decoded image samples.
///
/// Catalog IDs are non-negative, but signed image sample types can carry
/// negative values; one signed 64-bit domain holds both sides of the
/// comparison.
pub type LabelValue = i64;

/// The reference set of registered label identifiers.
///
/// Built once per run, never mutated afterwards; all reconciliation work
/// reads the same instance.
pub type LabelCatalog = HashSet<LabelValue>;

/// Name of the identifier column in the catalog header row.
const ID_COLUMN: &str = "id";

/// Load the reference catalog into an immutable set of label IDs.
///
/// Every row's `id` value must parse as an integer; a single bad row
/// invalidates the whole load, since a partially valid catalog would make
/// the rest of the pipeline untrustworthy. Duplicate IDs collapse to one
/// entry and row order does not affect the result.
pub fn load_catalog(path: &Path) -> Result<LabelCatalog> {
    if !path.is_file() {
        return Err(Error::CatalogNotFound(path.to_path_buf()));
    }

    let mut reader =
        csv::Reader::from_path(path).map_err(|_| Error::CatalogNotFound(path.to_path_buf()))?;

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, e.to_string()))?;
    let id_index = headers
        .iter()
        .position(|name| name == ID_COLUMN)
        .ok_or_else(|| parse_error(path, format!("missing '{}' column", ID_COLUMN)))?;

    let mut ids = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| parse_error(path, e.to_string()))?;
        let field = record
            .get(id_index)
            .ok_or_else(|| parse_error(path, format!("row missing '{}' field", ID_COLUMN)))?;
        let id: LabelValue = field
            .trim()
            .parse()
            .map_err(|_| parse_error(path, format!("invalid ID value '{}'", field)))?;
        ids.insert(id);
    }

    Ok(ids)
}

fn parse_error(path: &Path, detail: String) -> Error {
    Error::CatalogParse {
        path: path.to_path_buf(),
        detail,
    }
}

// -- Tests --
