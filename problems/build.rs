use std::{
    env,
    error::Error,
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    process,
};

/// One row of `problem-codes.csv`.
struct ProblemRow {
    /// Stable code shown to users (e.g. `P0104`).
    code: String,
    /// Name of the enumeration variant.
    name: String,
    /// Fixed message for the problem.
    message: String,
}

fn read_rows(path: &Path) -> Result<Vec<ProblemRow>, Box<dyn Error>> {
    let src =
        fs::read_to_string(path).map_err(|e| format!("Unable to read {}: {}", path.display(), e))?;

    let mut rows = vec![];
    let mut reader = csv::Reader::from_reader(src.as_bytes());
    for record in reader.records() {
        let record = record?;
        let column = |idx: usize| {
            record
                .get(idx)
                .map(|s| s.trim().to_string())
                .ok_or_else(|| format!("Record {:?} has no column {}", record, idx))
        };
        rows.push(ProblemRow {
            code: column(0)?,
            name: column(1)?,
            message: column(2)?,
        });
    }
    Ok(rows)
}

fn render(rows: &[ProblemRow]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    writeln!(out, "#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]")?;
    writeln!(out, "pub enum Problem {{")?;
    for row in rows {
        writeln!(out, "    {},", row.name)?;
    }
    writeln!(out, "}}\n")?;

    writeln!(out, "impl Problem {{")?;
    writeln!(out, "    /// Returns the stable code for the problem.")?;
    writeln!(out, "    pub fn code(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for row in rows {
        writeln!(out, "            Problem::{} => {:?},", row.name, row.code)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}\n")?;

    writeln!(out, "    /// Returns the fixed message for the problem.")?;
    writeln!(out, "    pub fn message(&self) -> &'static str {{")?;
    writeln!(out, "        match self {{")?;
    for row in rows {
        writeln!(
            out,
            "            Problem::{} => {:?},",
            row.name, row.message
        )?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    Ok(out)
}

fn generate() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=resources/problem-codes.csv");

    let mut src_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    src_path.push("resources");
    src_path.push("problem-codes.csv");

    let rows = read_rows(&src_path)?;
    let generated = render(&rows)?;

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    fs::create_dir_all(&out_dir)?;
    fs::write(out_dir.join("problems.rs"), generated)
        .map_err(|e| format!("Unable to write problems.rs: {}", e))?;

    Ok(())
}

fn main() {
    if let Err(err) = generate() {
        println!("cargo:warning=problem generating problems.rs: {}", err);
        process::exit(1);
    }
}
