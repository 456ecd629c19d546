use std::collections::HashMap;

/// Dense integer substitute for a kernel name
///
/// Tokens are positive and assigned in first-appearance order starting at 1,
/// so they feed directly into the u64 rolling hash.
pub type Token = u64;

/// Encode kernel names into a dense token sequence
///
/// Each distinct name gets the next unused token on first sight; the returned
/// map allows rendering a human-readable name back from a token. Two traces
/// always get independent encodings.
///
/// # Example
/// ```
/// use bloque::block::encode_kernel_names;
///
/// let (encoded, mapping) = encode_kernel_names(["gemm", "softmax", "gemm"]);
/// assert_eq!(encoded, vec![1, 2, 1]);
/// assert_eq!(mapping.get("softmax"), Some(&2));
/// ```
pub fn encode_kernel_names<'a, I>(names: I) -> (Vec<Token>, HashMap<String, Token>)
where
    I: IntoIterator<Item = &'a str>,
{
    let mut mapping: HashMap<String, Token> = HashMap::new();
    let mut encoded = Vec::new();

    for name in names {
        let token = match mapping.get(name) {
            Some(&token) => token,
            None => {
                let token = mapping.len() as Token + 1;
                mapping.insert(name.to_string(), token);
                token
            }
        };
        encoded.push(token);
    }

    (encoded, mapping)
}
