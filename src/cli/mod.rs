//! FG-011: CLI subcommands — init, validate, plan, assemble.

use crate::core::{artifact, assembler, memory, parser, resolver};
use clap::Subcommand;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new fragua project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate fragua.yaml (and optionally a cells directory)
    Validate {
        /// Path to fragua.yaml
        #[arg(short, long, default_value = "fragua.yaml")]
        file: PathBuf,

        /// Directory of CodeCell JSON records
        #[arg(long)]
        cells: Option<PathBuf>,
    },

    /// Resolve and show the execution order, dependencies, and conflicts
    Plan {
        /// Path to fragua.yaml
        #[arg(short, long, default_value = "fragua.yaml")]
        file: PathBuf,
    },

    /// Assemble the code cells into one executable program
    Assemble {
        /// Path to fragua.yaml
        #[arg(short, long, default_value = "fragua.yaml")]
        file: PathBuf,

        /// Directory of CodeCell JSON records
        #[arg(long, default_value = "cells")]
        cells: PathBuf,

        /// Output directory for the program artifact
        #[arg(short, long, default_value = "generated")]
        out_dir: PathBuf,

        /// Print the program instead of writing an artifact
        #[arg(long)]
        stdout: bool,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file, cells } => cmd_validate(&file, cells.as_deref()),
        Commands::Plan { file } => cmd_plan(&file),
        Commands::Assemble {
            file,
            cells,
            out_dir,
            stdout,
        } => cmd_assemble(&file, &cells, &out_dir, stdout),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("fragua.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let cells_dir = path.join("cells");
    std::fs::create_dir_all(&cells_dir)
        .map_err(|e| format!("cannot create cells dir: {}", e))?;

    let template = r#"version: "1.0"

task:
  domain: spin
  problem: tfim_ground_energy
  algorithm: vqe
  backend: qiskit
  params:
    n: 4
    hx: 1.0

# Cell record ids should match component names so the assembler can follow
# the resolved execution order.
components:
  - name: Hamiltonian.TFIM
    kind: hamiltonian
    tags: [spin, tfim]
    needs: []
    provides: [hamiltonian]
    params_schema:
      n: int
      hx: float
    yields:
      hamiltonian: SparsePauliOp

  - name: Algorithm.VQE
    kind: algorithm
    tags: [spin]
    needs: [hamiltonian]
    provides: [energy]
    params_schema:
      optimizer: [COBYLA, SPSA]
    yields:
      energy: float

params:
  values:
    n: 4
    hx: 1.0
  aliases:
    num_qubits: n
  defaults:
    optimizer: COBYLA
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized fragua project at {}", path.display());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}/", cells_dir.display());
    Ok(())
}

fn cmd_validate(file: &Path, cells_dir: Option<&Path>) -> Result<(), String> {
    let config = parser::parse_config_file(file)?;
    let mut errors = parser::validate_config(&config);

    let mut cell_count = 0;
    if let Some(dir) = cells_dir {
        let cells = parser::load_cells_dir(dir)?;
        cell_count = cells.len();
        for cell in &cells {
            errors.extend(parser::validate_cell(cell));
        }
    }

    if errors.is_empty() {
        println!(
            "OK: {} ({} components, {} cells)",
            config.task.problem,
            config.components.len(),
            cell_count
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn cmd_plan(file: &Path) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let plan = resolver::resolve(&config.components).map_err(|e| e.to_string())?;

    println!("Execution order for {}:", config.task.problem);
    for (i, name) in plan.execution_order.iter().enumerate() {
        let needs = &plan.dependency_graph[name];
        let card = config.components.iter().find(|c| &c.name == name);
        let yields: Vec<&str> = card
            .map(|c| c.yields.keys().map(String::as_str).collect())
            .unwrap_or_default();
        print!("  {}. {}", i + 1, name);
        if !needs.is_empty() {
            print!("  needs [{}]", needs.join(", "));
        }
        if !yields.is_empty() {
            print!("  yields [{}]", yields.join(", "));
        }
        println!();
    }

    for conflict in &plan.conflicts {
        println!("  WARNING: conflict: {}", conflict);
    }
    Ok(())
}

fn cmd_assemble(
    file: &Path,
    cells_dir: &Path,
    out_dir: &Path,
    to_stdout: bool,
) -> Result<(), String> {
    let config = parse_and_validate(file)?;
    let plan = resolver::resolve(&config.components).map_err(|e| e.to_string())?;
    for conflict in &plan.conflicts {
        eprintln!("  WARNING: conflict: {}", conflict);
    }

    let store: memory::CellStore = parser::load_cells_dir(cells_dir)?.into_iter().collect();

    // With no resolver output in the file, the task card's raw params
    // stand in as the resolved values.
    let mut params = config.params.clone();
    if params.values.is_empty() {
        params.values = config.task.params.clone();
    }
    for e in &params.errors {
        eprintln!("  WARNING: param: {}", e);
    }

    let generated_at = artifact::now_iso8601();
    let source = assembler::Assembler::new()
        .assemble(&store, &plan, &config.task, &params, &generated_at)
        .map_err(|e| e.to_string())?;

    if to_stdout {
        print!("{}", source);
        return Ok(());
    }

    let path = artifact::write_artifact(
        out_dir,
        &config.task.problem,
        &artifact::now_compact(),
        &source,
    )?;
    println!(
        "Assembled {} cells into {}",
        store.len(),
        path.display()
    );
    Ok(())
}

fn parse_and_validate(file: &Path) -> Result<parser::PipelineConfig, String> {
    let config = parser::parse_config_file(file)?;
    let errors = parser::validate_config(&config);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        return Err(format!("{} validation error(s)", errors.len()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fg011_init_creates_valid_project() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();

        let config = parser::parse_config_file(&dir.path().join("fragua.yaml")).unwrap();
        assert!(parser::validate_config(&config).is_empty());
        assert!(dir.path().join("cells").is_dir());

        // The template resolves without cycles.
        let plan = resolver::resolve(&config.components).unwrap();
        assert_eq!(
            plan.execution_order,
            vec!["Hamiltonian.TFIM", "Algorithm.VQE"]
        );
    }

    #[test]
    fn test_fg011_init_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        assert!(cmd_init(dir.path()).is_err());
    }

    #[test]
    fn test_fg011_assemble_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();

        let cells = dir.path().join("cells");
        std::fs::write(
            cells.join("01_ham.json"),
            r#"{
                "id": "Hamiltonian.TFIM",
                "imports": ["from qiskit.quantum_info import SparsePauliOp", "import numpy as np"],
                "helpers": ["def build_tfim(n, hx):\n    terms = [('Z' * n, -1.0), ('X' + 'I' * (n - 1), -hx)]\n    return SparsePauliOp.from_list(terms)"],
                "definitions": [],
                "invoke": "H = build_tfim(n, hx)",
                "exports": {"hamiltonian": "H"}
            }"#,
        )
        .unwrap();
        std::fs::write(
            cells.join("02_vqe.json"),
            r#"{
                "id": "Algorithm.VQE",
                "imports": ["import numpy as np"],
                "helpers": [],
                "definitions": ["shots = 1024"],
                "invoke": "energy = float(np.min(np.linalg.eigvalsh(H.to_matrix())))\nprint(energy)",
                "exports": {"energy": "energy"}
            }"#,
        )
        .unwrap();

        let out = dir.path().join("generated");
        cmd_assemble(&dir.path().join("fragua.yaml"), &cells, &out, false).unwrap();

        let artifacts: Vec<_> = std::fs::read_dir(&out)
            .unwrap()
            .filter_map(Result::ok)
            .collect();
        assert_eq!(artifacts.len(), 1);

        let text = std::fs::read_to_string(artifacts[0].path()).unwrap();
        assert!(text.contains("# --- Hamiltonian.TFIM ---"));
        assert!(text.contains("# --- Algorithm.VQE ---"));
        assert!(text.contains("def main(n: int = 4, hx: float = 1.0, optimizer: str = 'COBYLA'):"));
        assert_eq!(text.matches("import numpy as np").count(), 1);
    }

    #[test]
    fn test_fg011_assemble_empty_cells_fails() {
        let dir = tempfile::tempdir().unwrap();
        cmd_init(dir.path()).unwrap();
        let result = cmd_assemble(
            &dir.path().join("fragua.yaml"),
            &dir.path().join("cells"),
            &dir.path().join("generated"),
            false,
        );
        assert!(result.unwrap_err().contains("no code cells"));
    }
}
