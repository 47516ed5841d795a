/// A C++ type as written in a declaration, split into the forms the emitters need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Normalized declared text, e.g. `const std::string &`.
    pub text: String,
    /// Text with `const`, `volatile` and reference markers removed; pointers are kept.
    pub raw: String,
    /// Declared as an lvalue reference (`T &`).
    pub is_reference: bool,
}

/// Split declared type text into its normalized, raw and reference forms.
///
/// Whitespace is collapsed so that `const  double&` and `const double &`
/// produce identical text.
pub fn split_declared_type(decl: &str) -> DeclaredType {
    let tokens = tokenize(decl);

    let is_reference = tokens.iter().any(|t| *t == "&");
    let text = join_tokens(tokens.iter().copied());
    let raw = join_tokens(
        tokens
            .iter()
            .copied()
            .filter(|t| !matches!(*t, "const" | "volatile" | "&" | "&&")),
    );

    DeclaredType {
        text,
        raw,
        is_reference,
    }
}

fn tokenize(decl: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = None;
    let bytes = decl.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'*' | b'&' => {
                if let Some(s) = start.take() {
                    tokens.push(&decl[s..i]);
                }
                if c == b'&' && bytes.get(i + 1) == Some(&b'&') {
                    tokens.push("&&");
                    i += 2;
                    continue;
                }
                tokens.push(if c == b'*' { "*" } else { "&" });
            }
            c if c.is_ascii_whitespace() => {
                if let Some(s) = start.take() {
                    tokens.push(&decl[s..i]);
                }
            }
            // Keep template arguments together so `std::map<int, int>` stays one token.
            b'<' => {
                let s = start.unwrap_or(i);
                let end = matching_angle(bytes, i);
                tokens.push(decl[s..end].trim());
                start = None;
                i = end;
                continue;
            }
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
        i += 1;
    }

    if let Some(s) = start {
        tokens.push(&decl[s..]);
    }

    tokens
}

fn matching_angle(bytes: &[u8], open: usize) -> usize {
    let mut depth = 0usize;
    for (offset, &b) in bytes[open..].iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' => {
                depth -= 1;
                if depth == 0 {
                    return open + offset + 1;
                }
            }
            _ => {}
        }
    }
    bytes.len()
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for token in tokens {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    out
}
