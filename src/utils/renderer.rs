/// The submission form served at the root path
const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>Fake News Detector</title>
  </head>
  <body>
    <h1>Fake News Detector</h1>
    <p>Paste a news text to find out whether {{ model_name }} thinks it is fake or real.</p>
    <form id="detect" action="/detect" method="post">
      <textarea name="text" rows="12" cols="80" required></textarea>
      <br />
      <button type="submit">Detect</button>
    </form>
    <p id="inference"></p>
    <script>
      document.getElementById("detect").addEventListener("submit", async (event) => {
        event.preventDefault();
        const response = await fetch("/detect", {
          method: "POST",
          body: new URLSearchParams(new FormData(event.target)),
        });
        const body = await response.json();
        document.getElementById("inference").textContent = body.inference ?? body.error;
      });
    </script>
  </body>
</html>
"#;

/// Render the index page for the named model
pub fn render_index(model_name: &str) -> Result<String, liquid::Error> {
    let template = liquid::ParserBuilder::with_stdlib()
        .build()?
        .parse(INDEX_TEMPLATE)?;

    let globals = liquid::object!({
        "model_name": model_name,
    });

    template.render(&globals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_the_submission_form() {
        let html = render_index("fake_news_detector").unwrap();

        assert!(html.contains("fake_news_detector thinks"));
        assert!(html.contains(r#"action="/detect""#));
        assert!(html.contains(r#"name="text""#));
    }
}
