use json::JsonValue;

use crate::{
    error::OlivineError,
    problem::{BoundaryAxis, ElasticCase},
};

/// Everything the problem-definition file carries: material constants and
/// the Dirichlet boundary conditions to register, in order.
#[derive(Debug)]
pub struct ModelInput {
    pub youngs_modulus: f64,
    pub poisson_ratio: f64,
    pub density: f64,
    pub gravity: f64,
    pub elastic_case: ElasticCase,
    pub boundary_conditions: Vec<InputBoundaryCondition>,
}

#[derive(Debug)]
pub struct InputBoundaryCondition {
    pub domain: String,
    pub axis: BoundaryAxis,
    pub value: f64,
}

/// Parses the problem-definition JSON file.
///
/// # Arguments
/// * `input_file` - The path to the input file
///
/// # Returns
/// A ModelInput instance
pub fn load_input_file(input_file: &str) -> Result<ModelInput, OlivineError> {
    let file_string = match std::fs::read_to_string(input_file) {
        Ok(f) => f,
        Err(_err) => {
            return Err(OlivineError::Input(format!(
                "Unable to open input file {}",
                input_file
            )))
        }
    };

    let input_json = match json::parse(&file_string) {
        Ok(f) => f,
        Err(err) => {
            return Err(OlivineError::Input(format!(
                "Error in input file json: {err}"
            )))
        }
    };

    parse_input(&input_json)
}

fn parse_input(input_json: &JsonValue) -> Result<ModelInput, OlivineError> {
    if !input_json.has_key("metadata") {
        return Err(OlivineError::Input(
            "Input json missing metadata field".to_string(),
        ));
    }
    if !input_json.has_key("boundary_conditions") {
        return Err(OlivineError::Input(
            "Input json missing boundary_conditions field".to_string(),
        ));
    }

    let metadata = &input_json["metadata"];
    let youngs_modulus = metadata["material_elasticity"].as_f64();
    let poisson_ratio = metadata["poisson_ratio"].as_f64();
    let density = metadata["density"].as_f64();
    let gravity = metadata["gravity"].as_f64();

    if youngs_modulus.is_none() {
        return Err(OlivineError::Input(
            "Input json missing material_elasticity field in metadata section".to_string(),
        ));
    }
    if poisson_ratio.is_none() {
        return Err(OlivineError::Input(
            "Input json missing poisson_ratio field in metadata section".to_string(),
        ));
    }
    if density.is_none() {
        return Err(OlivineError::Input(
            "Input json missing density field in metadata section".to_string(),
        ));
    }
    if gravity.is_none() {
        return Err(OlivineError::Input(
            "Input json missing gravity field in metadata section".to_string(),
        ));
    }

    let elastic_case = match metadata["elastic_case"].as_str() {
        Some("plane_stress") => ElasticCase::PlaneStress,
        Some("plane_strain") => ElasticCase::PlaneStrain,
        Some("axisymmetric") => ElasticCase::Axisymmetric,
        Some(other) => {
            return Err(OlivineError::Input(format!(
                "Unknown elastic_case {:?}; expected plane_stress, plane_strain or axisymmetric",
                other
            )))
        }
        None => {
            return Err(OlivineError::Input(
                "Input json missing elastic_case field in metadata section".to_string(),
            ))
        }
    };

    let mut boundary_conditions: Vec<InputBoundaryCondition> = Vec::new();
    for rule_json in input_json["boundary_conditions"].members() {
        let domain = match rule_json["domain"].as_str() {
            Some(d) => d.to_string(),
            None => {
                return Err(OlivineError::Input(
                    "Boundary condition is missing domain field".to_string(),
                ))
            }
        };
        let axis = match rule_json["axis"].as_str() {
            Some("x") => BoundaryAxis::X,
            Some("y") => BoundaryAxis::Y,
            Some(other) => {
                return Err(OlivineError::Input(format!(
                    "Boundary condition on {} has unknown axis {:?}; expected x or y",
                    domain, other
                )))
            }
            None => {
                return Err(OlivineError::Input(format!(
                    "Boundary condition on {} is missing axis field",
                    domain
                )))
            }
        };
        let value = match rule_json["value"].as_f64() {
            Some(v) => v,
            None => {
                return Err(OlivineError::Input(format!(
                    "Boundary condition on {} is missing value field",
                    domain
                )))
            }
        };

        boundary_conditions.push(InputBoundaryCondition {
            domain,
            axis,
            value,
        });
    }

    Ok(ModelInput {
        youngs_modulus: youngs_modulus.unwrap(),
        poisson_ratio: poisson_ratio.unwrap(),
        density: density.unwrap(),
        gravity: gravity.unwrap(),
        elastic_case,
        boundary_conditions,
    })
}
