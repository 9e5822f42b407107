//! HTML pages served by the web adapter.

use html_escape::{encode_double_quoted_attribute, encode_text};

/// Upload-or-URL form posting to `/process/` and showing the JSON reply.
pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>scan2pdf</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; }
  fieldset { margin-bottom: 1rem; }
  #result { white-space: pre-wrap; padding: .75rem; border-radius: 4px; }
  .ok { background: #e6f4ea; } .err { background: #fce8e6; }
</style>
</head>
<body>
<h1>Searchable PDF</h1>
<form id="ocr-form">
  <fieldset>
    <legend>Input</legend>
    <p><label>File (image or PDF): <input type="file" name="file" accept=".jpg,.jpeg,.png,.bmp,.tiff,.tif,.pdf"></label></p>
    <p><label>or URL: <input type="url" name="url" size="50" placeholder="https://example.com/scan.pdf"></label></p>
  </fieldset>
  <fieldset>
    <legend>Options</legend>
    <label><input type="checkbox" name="deskew" value="true" checked> deskew</label>
    <label><input type="checkbox" name="rotate_pages" value="true" checked> rotate pages</label>
    <label><input type="checkbox" name="remove_background" value="true"> remove background</label>
    <input type="hidden" name="options_present" value="true">
  </fieldset>
  <button type="submit">Run OCR</button>
</form>
<p id="result"></p>
<script>
document.getElementById('ocr-form').addEventListener('submit', async (ev) => {
  ev.preventDefault();
  const out = document.getElementById('result');
  out.className = ''; out.textContent = 'Processing…';
  const resp = await fetch('/process/', { method: 'POST', body: new FormData(ev.target) });
  const body = await resp.json();
  if (body.success) { out.className = 'ok'; out.textContent = body.message + '\n' + body.output_path; }
  else { out.className = 'err'; out.textContent = body.error; }
});
</script>
</body>
</html>
"#;

/// What to show under the legacy PDF form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeOutcome {
    /// OCR finished; link to the result.
    Success { output_url: String },
    /// OCR failed; show the message verbatim.
    Error(String),
}

/// Render the legacy `/home` page, optionally with the outcome of a run.
pub fn render_home(outcome: Option<&HomeOutcome>) -> String {
    let result = match outcome {
        None => String::new(),
        Some(HomeOutcome::Success { output_url }) => format!(
            r#"<p class="ok">OCR complete. <a href="{}">Download searchable PDF</a></p>"#,
            encode_double_quoted_attribute(output_url)
        ),
        Some(HomeOutcome::Error(message)) => {
            format!(r#"<p class="err">Error: {}</p>"#, encode_text(message))
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>OCR a PDF</title></head>
<body>
<h1>OCR a PDF</h1>
<form method="post" action="/home" enctype="multipart/form-data">
  <input type="file" name="pdf_file" accept=".pdf">
  <button type="submit">Upload</button>
</form>
{result}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_home_has_form_only() {
        let html = render_home(None);
        assert!(html.contains(r#"name="pdf_file""#));
        assert!(!html.contains("class=\"ok\""));
        assert!(!html.contains("class=\"err\""));
    }

    #[test]
    fn success_links_output() {
        let html = render_home(Some(&HomeOutcome::Success {
            output_url: "/media/OCR_doc.pdf".into(),
        }));
        assert!(html.contains(r#"href="/media/OCR_doc.pdf""#));
    }

    #[test]
    fn error_text_is_escaped() {
        let html = render_home(Some(&HomeOutcome::Error("<script>x</script>".into())));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>x"));
    }

    #[test]
    fn index_posts_to_process() {
        assert!(INDEX_HTML.contains("'/process/'"));
        assert!(INDEX_HTML.contains(r#"name="file""#));
        assert!(INDEX_HTML.contains(r#"name="url""#));
    }
}
