use std::io::Write;

use crate::error::OlivineError;
use nalgebra::DVector;

/// Writes the displacement field to a text file: a header line with the node
/// count and the number of fields per node, then one `ux uy` line per node
/// in node-index order.
///
/// # Arguments
/// * `n_nodes` - Number of mesh nodes
/// * `displacement` - Solution vector, ordered `(x0, y0, x1, y1, ...)`
/// * `output` - The filename of the output file
pub fn write_solution(
    n_nodes: usize,
    displacement: &DVector<f64>,
    output: &str,
) -> Result<(), OlivineError> {
    if displacement.nrows() != 2 * n_nodes {
        return Err(OlivineError::Dimension(format!(
            "Solution has {} entries but the mesh has {} nodes",
            displacement.nrows(),
            n_nodes
        )));
    }

    let mut file = match std::fs::File::create(output) {
        Ok(f) => f,
        Err(err) => {
            return Err(OlivineError::Input(format!(
                "Failed to create solution file {}: {}",
                output, err
            )));
        }
    };

    let mut contents = format!("{} {}\n", n_nodes, 2);
    for node in 0..n_nodes {
        contents.push_str(&format!(
            "{:.14e} {:.14e}\n",
            displacement[2 * node],
            displacement[2 * node + 1]
        ));
    }

    if let Err(err) = file.write_all(contents.as_bytes()) {
        return Err(OlivineError::Input(format!(
            "Failed to write solution file {}: {}",
            output, err
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_one_line_per_node() {
        let displacement = DVector::from_vec(vec![1.0, -2.0, 0.5, 0.0]);
        let path = std::env::temp_dir().join("olivine_solution_test.txt");
        let path = path.to_str().unwrap();

        write_solution(2, &displacement, path).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2 2");

        let first: Vec<f64> = lines[1]
            .split_whitespace()
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(first, vec![1.0, -2.0]);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn size_mismatch_is_a_dimension_error() {
        let displacement = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        let err = write_solution(2, &displacement, "unused.txt").unwrap_err();
        assert!(matches!(err, OlivineError::Dimension(_)));
    }
}
