pub mod models;
pub mod page;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Migration, Module};
use serde_json::json;

pub use routes::BooksState;

/// Search, shelve, and list classified books
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(state: BooksState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    fn base_path(&self) -> String {
        "/".to_string()
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            classify = %self.state.classify.base_url(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = json!({
            "description": "Request failed",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });
        let query = |name: &str, required: bool, description: &str| {
            json!({
                "name": name,
                "in": "query",
                "required": required,
                "schema": { "type": "string" },
                "description": description
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Index page with the current shelf",
                        "tags": ["Books"],
                        "parameters": [query("name", false, "Name to greet")],
                        "responses": {
                            "200": { "description": "HTML page", "content": { "text/html": {} } },
                            "500": error_response
                        }
                    }
                },
                "/search": {
                    "get": {
                        "summary": "Search the Classify API by title",
                        "tags": ["Books"],
                        "parameters": [query("search", true, "Title to search for")],
                        "responses": {
                            "200": {
                                "description": "Matching works",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/SearchResult" }
                                        }
                                    }
                                }
                            },
                            "400": error_response,
                            "500": error_response
                        }
                    }
                },
                "/books": {
                    "get": {
                        "summary": "List shelved books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "Shelved books ordered by primary key",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error_response
                        }
                    }
                },
                "/books/add": {
                    "post": {
                        "summary": "Look up a work by owi and shelve it",
                        "tags": ["Books"],
                        "parameters": [query("id", true, "Classify work identifier (owi)")],
                        "responses": {
                            "200": {
                                "description": "The inserted book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            },
                            "400": error_response,
                            "404": error_response,
                            "500": error_response
                        }
                    }
                },
                "/books/delete": {
                    "post": {
                        "summary": "Remove a shelved book",
                        "tags": ["Books"],
                        "parameters": [query("pk", true, "Primary key of the book")],
                        "responses": {
                            "200": { "description": "Deleted, or nothing to delete" },
                            "400": error_response,
                            "500": error_response
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "SearchResult": {
                        "type": "object",
                        "properties": {
                            "Title": { "type": "string" },
                            "Author": { "type": "string" },
                            "Year": { "type": "string" },
                            "ID": { "type": "string", "description": "Work identifier (owi)" }
                        },
                        "required": ["Title", "Author", "Year", "ID"]
                    },
                    "Book": {
                        "type": "object",
                        "properties": {
                            "PK": { "type": "integer", "description": "Store-assigned primary key" },
                            "Title": { "type": "string" },
                            "Author": { "type": "string" },
                            "ID": { "type": "string", "description": "Work identifier (owi)" },
                            "Classification": { "type": "string", "description": "Dewey classification" }
                        },
                        "required": ["PK", "Title", "Author", "ID", "Classification"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE IF NOT EXISTS books (
                    pk             INTEGER PRIMARY KEY,
                    title          TEXT,
                    author         TEXT,
                    id             TEXT,
                    classification TEXT
                );
                "#,
        }]
    }
}

/// Create a new instance of the books module
pub fn create_module(state: BooksState) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(state))
}
