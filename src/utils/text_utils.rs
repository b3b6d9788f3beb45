// Used by the CLI to print comment bodies on a single
// line. Counts chars and not bytes so we never cut in
// the middle of a multibyte character.
pub fn excerpt(text: &str, max_chars: usize) -> String {
  let flat: String = text.split_whitespace()
    .collect::<Vec<&str>>()
    .join(" ");
  if flat.chars().count() <= max_chars {
    flat
  } else {
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
  }
}
