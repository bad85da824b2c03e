//! Server-side rendering of the index page.

use super::models::IndexPage;

const SCRIPT: &str = r#"
async function searchBooks(event) {
  event.preventDefault();
  const term = document.getElementById("search").value;
  const response = await fetch("/search?search=" + encodeURIComponent(term));
  const body = document.getElementById("search-results");
  body.innerHTML = "";
  if (!response.ok) { return; }
  for (const work of await response.json()) {
    const row = body.insertRow();
    for (const value of [work.Title, work.Author, work.Year]) {
      row.insertCell().textContent = value;
    }
    const button = document.createElement("button");
    button.textContent = "Add";
    button.onclick = () => addBook(work.ID);
    row.insertCell().appendChild(button);
  }
}

async function addBook(id) {
  const response = await fetch("/books/add?id=" + encodeURIComponent(id), { method: "POST" });
  if (response.ok) { window.location.reload(); }
}

async function deleteBook(pk) {
  const response = await fetch("/books/delete?pk=" + pk, { method: "POST" });
  if (response.ok) { window.location.reload(); }
}
"#;

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn render_index(page: &IndexPage) -> String {
    let rows: String = page
        .books
        .iter()
        .map(|book| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td><button onclick=\"deleteBook({})\">Delete</button></td></tr>",
                escape_html(&book.title),
                escape_html(&book.author),
                escape_html(&book.classification),
                book.pk,
            )
        })
        .collect();

    let status = if page.db_status {
        "database connected"
    } else {
        "database unreachable"
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Bookshelf</title>
</head>
<body>
<h1>Hello, {name}</h1>
<p id="db-status">{status}</p>
<form onsubmit="searchBooks(event)">
<input id="search" name="search" placeholder="Search by title">
<button type="submit">Search</button>
</form>
<table>
<thead><tr><th>Title</th><th>Author</th><th>Year</th><th></th></tr></thead>
<tbody id="search-results"></tbody>
</table>
<h2>Shelf</h2>
<table>
<thead><tr><th>Title</th><th>Author</th><th>Classification</th><th></th></tr></thead>
<tbody id="books">{rows}</tbody>
</table>
<script>{script}</script>
</body>
</html>
"#,
        name = escape_html(&page.name),
        status = status,
        rows = rows,
        script = SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_db::Book;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn renders_greeting_status_and_books() {
        let html = render_index(&IndexPage {
            name: "Ada <3".to_string(),
            db_status: true,
            books: vec![Book {
                pk: 7,
                title: "Hamlet".to_string(),
                author: "Shakespeare, William".to_string(),
                id: "44637874".to_string(),
                classification: "822.33".to_string(),
            }],
        });

        assert!(html.contains("<h1>Hello, Ada &lt;3</h1>"));
        assert!(html.contains("database connected"));
        assert!(html.contains("<td>Hamlet</td><td>Shakespeare, William</td><td>822.33</td>"));
        assert!(html.contains("deleteBook(7)"));
    }
}
