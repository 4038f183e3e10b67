use std::{fs, path::Path, str::SplitWhitespace};

use crate::{Error, GraphModel, Result};

/// Whitespace token stream with positional error messages.
struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            inner: text.split_whitespace(),
            position: 0,
        }
    }

    fn next(&mut self, what: &str) -> Result<&'a str> {
        self.position += 1;
        self.inner.next().ok_or_else(|| {
            Error::invalid_input(format!("Token {}: missing {what}", self.position))
        })
    }

    fn next_usize(&mut self, what: &str) -> Result<usize> {
        let tok = self.next(what)?;
        tok.parse().map_err(|_| {
            Error::invalid_input(format!("Token {}: invalid {what}: {tok}", self.position))
        })
    }

    fn next_f64(&mut self, what: &str) -> Result<f64> {
        let tok = self.next(what)?;
        tok.parse().map_err(|_| {
            Error::invalid_input(format!("Token {}: invalid {what}: {tok}", self.position))
        })
    }

    fn finish(mut self) -> Result<()> {
        match self.inner.next() {
            None => Ok(()),
            Some(tok) => Err(Error::invalid_input(format!(
                "Token {}: unexpected trailing token: {tok}",
                self.position + 1
            ))),
        }
    }
}

/// Job count followed by that many job names.
pub fn parse_manifest(text: &str) -> Result<Vec<String>> {
    let mut tokens = Tokens::new(text);
    let count = tokens.next_usize("job count")?;
    // Declared counts are untrusted; grow as names actually arrive.
    let mut jobs = Vec::new();
    for idx in 0..count {
        let name = tokens.next(&format!("job name {} of {count}", idx + 1))?;
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::invalid_input(format!(
                "Job name must be a plain file stem: {name}"
            )));
        }
        jobs.push(name.to_string());
    }
    tokens.finish()?;
    Ok(jobs)
}

/// Vertex count `n`, `n` labels, then the `n x n` distance matrix row by row.
/// The diagonal is read but ignored.
pub fn parse_graph(text: &str) -> Result<GraphModel> {
    let mut tokens = Tokens::new(text);
    let n = tokens.next_usize("vertex count")?;
    if n == 0 {
        return Err(Error::invalid_graph("graph declares no vertices"));
    }

    let mut labels = Vec::new();
    for idx in 0..n {
        labels.push(tokens.next(&format!("label {} of {n}", idx + 1))?.to_string());
    }

    // All n labels were present, so n is bounded by the input size from here on.
    let mut rows = Vec::with_capacity(n);
    for i in 0..n {
        let mut row = Vec::with_capacity(n);
        for j in 0..n {
            row.push(tokens.next_f64(&format!("distance {}-{}", labels[i], labels[j]))?);
        }
        rows.push(row);
    }
    tokens.finish()?;

    GraphModel::from_matrix(labels, rows)
}

pub fn read_manifest(path: &Path) -> Result<Vec<String>> {
    let text = read_text(path)?;
    parse_manifest(&text)
}

pub fn read_graph(path: &Path) -> Result<GraphModel> {
    let text = read_text(path)?;
    parse_graph(&text)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        Error::invalid_input(format!("failed to read {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_graph, parse_manifest};
    use crate::ErrorKind;

    #[test]
    fn parse_manifest_reads_count_then_names() {
        let jobs = parse_manifest("3\nalpha beta\n  gamma\n").expect("manifest");
        assert_eq!(jobs, vec!["alpha", "beta", "gamma"]);
        assert!(parse_manifest("0").expect("empty manifest").is_empty());
    }

    #[test]
    fn parse_manifest_rejects_short_lists() {
        let err = parse_manifest("3 alpha beta").expect_err("missing name");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("missing job name 3 of 3"));
    }

    #[test]
    fn parse_manifest_rejects_bad_count_and_paths() {
        let err = parse_manifest("two a b").expect_err("count");
        assert!(err.to_string().contains("invalid job count: two"));
        let err = parse_manifest("1 ../etc").expect_err("path");
        assert!(err.to_string().contains("plain file stem"));
    }

    #[test]
    fn parse_manifest_rejects_huge_count_without_allocating() {
        let err = parse_manifest("1000000000000000000 a").expect_err("huge count");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("missing job name 2 of 1000000000000000000"));
    }

    #[test]
    fn parse_graph_rejects_huge_vertex_count_without_allocating() {
        let err = parse_graph("1000000000000000000 a b").expect_err("huge n");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("missing label 3 of 1000000000000000000"));

        let err = parse_graph(&format!("{} a", usize::MAX)).expect_err("usize::MAX");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn parse_graph_reads_labels_and_matrix() {
        let g = parse_graph("3\nA B C\n0 1 3\n1 0 2\n3 2 0\n").expect("graph");
        assert_eq!(g.n(), 3);
        assert_eq!(g.labels(), &["A", "B", "C"]);
        assert_eq!(g.weight_by_label("A", "C").expect("weight"), 3.0);
    }

    #[test]
    fn parse_graph_ignores_the_diagonal() {
        let g = parse_graph("2 x y 7 1.5 1.5 9").expect("graph");
        assert_eq!(g.weight(0, 1).expect("weight"), 1.5);
    }

    #[test]
    fn parse_graph_reports_truncated_matrix() {
        let err = parse_graph("2 x y 0 1 1").expect_err("short matrix");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("missing distance y-y"));
    }

    #[test]
    fn parse_graph_rejects_non_numeric_and_trailing_tokens() {
        let err = parse_graph("2 x y 0 one 1 0").expect_err("bad number");
        assert!(err.to_string().contains("invalid distance x-y: one"));
        let err = parse_graph("1 x 0 extra").expect_err("trailing");
        assert!(err.to_string().contains("unexpected trailing token: extra"));
    }

    #[test]
    fn parse_graph_leaves_matrix_contract_to_the_model() {
        let err = parse_graph("2 x y 0 -1 -1 0").expect_err("negative");
        assert_eq!(err.kind(), ErrorKind::InvalidGraph);
        let err = parse_graph("2 x y 0 1 2 0").expect_err("asymmetric");
        assert_eq!(err.kind(), ErrorKind::InvalidGraph);
        let err = parse_graph("0").expect_err("empty");
        assert_eq!(err.kind(), ErrorKind::InvalidGraph);
    }
}
