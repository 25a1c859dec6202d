//! Particle position files written by the fluid simulator.
//!
//! One particle per line as whitespace separated `x y z`. Blank lines and
//! lines starting with `#` are skipped.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ember_math::Point3;

pub fn read_particles(path: &Path) -> Result<Vec<Point3>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read particles {}", path.display()))?;
    parse_particles(&text).with_context(|| format!("Invalid particle file {}", path.display()))
}

pub fn parse_particles(text: &str) -> Result<Vec<Point3>> {
    let mut positions = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let coords = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("line {}: bad number in {:?}", number + 1, line))?;

        let &[x, y, z] = coords.as_slice() else {
            bail!(
                "line {}: expected 3 coordinates, found {}",
                number + 1,
                coords.len()
            );
        };
        positions.push(Point3::new(x, y, z));
    }

    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_particles() {
        let text = "# frame 12\n400 400 400\n\n  1.5\t2 -3  \n";
        let positions = parse_particles(text).unwrap();
        assert_eq!(
            positions,
            vec![Point3::new(400.0, 400.0, 400.0), Point3::new(1.5, 2.0, -3.0)]
        );
    }

    #[test]
    fn test_wrong_arity() {
        let err = parse_particles("1 2 3\n4 5\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_bad_number() {
        assert!(parse_particles("1 2 z\n").is_err());
    }

    #[test]
    fn test_read_particles() {
        let path = std::env::temp_dir().join("ember_cli_particles.txt");
        fs::write(&path, "0 0 0\n1 1 1\n").unwrap();
        assert_eq!(read_particles(&path).unwrap().len(), 2);
        fs::remove_file(&path).ok();

        assert!(read_particles(Path::new("/no/such/particles.txt")).is_err());
    }
}
