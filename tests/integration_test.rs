use std::net::SocketAddr;

use serde_json::{json, Value};
use tokio::time::{sleep, Duration};

use bookshelf_api::{start_server, Config};

// Note: responses are inspected as raw JSON rather than through the
// application's models, so the wire format itself is under test
struct BookClient {
    client: reqwest::Client,
    base_url: String,
}

impl BookClient {
    fn new(addr: SocketAddr) -> Self {
        BookClient {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}/books"),
        }
    }

    async fn list_books(&self, query: &[(&str, &str)]) -> Result<Value, reqwest::Error> {
        self.client
            .get(&self.base_url)
            .query(query)
            .send()
            .await?
            .json::<Value>()
            .await
    }

    async fn insert_book_raw(&self, input: &Value) -> Result<reqwest::Response, reqwest::Error> {
        self.client.post(&self.base_url).json(input).send().await
    }

    async fn insert_book(&self, input: &Value) -> Result<String, reqwest::Error> {
        let body = self
            .insert_book_raw(input)
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(body["data"]["bookId"].as_str().unwrap_or_default().to_string())
    }

    async fn get_book_raw(&self, id: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .get(format!("{}/{id}", self.base_url))
            .send()
            .await
    }

    async fn get_book(&self, id: &str) -> Result<Value, reqwest::Error> {
        let body = self
            .get_book_raw(id)
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(body["data"]["book"].clone())
    }

    async fn update_book(&self, id: &str, input: &Value) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .put(format!("{}/{id}", self.base_url))
            .json(input)
            .send()
            .await
    }

    async fn delete_book(&self, id: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.client
            .delete(format!("{}/{id}", self.base_url))
            .send()
            .await
    }
}

fn book(name: &str, page_count: u32, read_page: u32, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2020,
        "author": "X",
        "summary": "s",
        "publisher": "P",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading,
    })
}

async fn assert_fail(response: reqwest::Response, code: u16, message: &str) -> Result<(), reqwest::Error> {
    assert_eq!(code, response.status().as_u16());
    let body = response.json::<Value>().await?;
    assert_eq!("fail", body["status"]);
    assert_eq!(message, body["message"]);
    Ok(())
}

async fn run_tests(client: BookClient) -> Result<(), reqwest::Error> {
    // Start with an empty shelf
    let books = client.list_books(&[]).await?;
    assert_eq!(json!({"status": "success", "data": {"books": []}}), books);

    // Add a finished book
    let response = client.insert_book_raw(&book("A", 100, 100, false)).await?;
    assert_eq!(201, response.status().as_u16());
    let body = response.json::<Value>().await?;
    assert_eq!("success", body["status"]);
    assert_eq!("Book added successfully", body["message"]);
    let finished_id = body["data"]["bookId"].as_str().unwrap().to_string();
    assert!(!finished_id.is_empty());

    let finished = client.get_book(&finished_id).await?;
    assert_eq!(finished_id, finished["id"]);
    assert_eq!("A", finished["name"]);
    assert_eq!(2020, finished["year"]);
    assert_eq!(100, finished["pageCount"]);
    assert_eq!(true, finished["finished"]);
    assert_eq!(finished["insertedAt"], finished["updatedAt"]);

    // And one still being read
    let harry_id = client
        .insert_book(&book("Harry Potter and the Chamber of Secrets", 251, 40, true))
        .await?;
    let harry = client.get_book(&harry_id).await?;
    assert_eq!(false, harry["finished"]);
    assert_eq!(true, harry["reading"]);

    // Invalid payloads are rejected
    let response = client.insert_book_raw(&book("Empty", 0, 0, false)).await?;
    assert_fail(
        response,
        400,
        "Failed to add book. pageCount and readPage must be greater than 0",
    )
    .await?;

    let mut overread = book("Overread", 10, 11, true);
    overread["name"] = Value::Null;
    let response = client.insert_book_raw(&overread).await?;
    assert_fail(
        response,
        400,
        "Failed to add book. readPage must not be greater than pageCount",
    )
    .await?;

    let response = client.insert_book_raw(&json!({"year": 2020})).await?;
    assert_eq!(400, response.status().as_u16());

    let negative = json!({"name": "Negative", "pageCount": -1, "readPage": 0});
    let response = client.insert_book_raw(&negative).await?;
    assert_eq!(400, response.status().as_u16());
    assert_eq!("fail", response.json::<Value>().await?["status"]);

    // A third book, neither reading nor finished
    client.insert_book(&book("The Dharma Bums", 10, 5, false)).await?;

    // Listing projects each book to id, name and publisher
    let books = client.list_books(&[]).await?;
    let listed = books["data"]["books"].as_array().unwrap();
    assert_eq!(3, listed.len());
    assert_eq!(
        json!({"id": finished_id, "name": "A", "publisher": "P"}),
        listed[0]
    );

    let books = client.list_books(&[("name", "harry")]).await?;
    let listed = books["data"]["books"].as_array().unwrap();
    assert_eq!(1, listed.len());
    assert_eq!(harry_id, listed[0]["id"]);

    let books = client.list_books(&[("finished", "1")]).await?;
    let listed = books["data"]["books"].as_array().unwrap();
    assert_eq!(1, listed.len());
    assert_eq!(finished_id, listed[0]["id"]);

    // The last supplied filter wins over earlier ones
    let books = client.list_books(&[("name", "harry"), ("reading", "")]).await?;
    let listed = books["data"]["books"].as_array().unwrap();
    assert_eq!(2, listed.len());
    assert!(listed.iter().all(|book| book["id"] != harry_id.as_str()));

    // Any non-empty flag counts as true, "0" included
    let books = client.list_books(&[("reading", "0")]).await?;
    let listed = books["data"]["books"].as_array().unwrap();
    assert_eq!(1, listed.len());
    assert_eq!(harry_id, listed[0]["id"]);

    // Retrieve a non-existent book
    let response = client.get_book_raw("no-such-book").await?;
    assert_fail(response, 404, "Book not found").await?;

    // Update replaces every mutable field but keeps the identity
    sleep(Duration::from_millis(5)).await;
    let response = client
        .update_book(
            &harry_id,
            &json!({
                "name": "Harry Potter and the Prisoner of Azkaban",
                "year": 1999,
                "author": "J. K. Rowling",
                "summary": "Sirius",
                "publisher": "Bloomsbury",
                "pageCount": 317,
                "readPage": 317,
                "reading": false,
            }),
        )
        .await?;
    assert_eq!(200, response.status().as_u16());
    let body = response.json::<Value>().await?;
    assert_eq!(
        json!({"status": "success", "message": "Book updated successfully"}),
        body
    );

    let updated = client.get_book(&harry_id).await?;
    assert_eq!(harry_id, updated["id"]);
    assert_eq!("Harry Potter and the Prisoner of Azkaban", updated["name"]);
    assert_eq!(1999, updated["year"]);
    assert_eq!("J. K. Rowling", updated["author"]);
    assert_eq!("Sirius", updated["summary"]);
    assert_eq!("Bloomsbury", updated["publisher"]);
    assert_eq!(317, updated["readPage"]);
    assert_eq!(false, updated["reading"]);
    assert_eq!(true, updated["finished"]);
    assert_eq!(harry["insertedAt"], updated["insertedAt"]);
    // ISO-8601 strings with a fixed format order chronologically
    assert!(updated["updatedAt"].as_str().unwrap() > harry["updatedAt"].as_str().unwrap());

    // Invalid updates are rejected and leave the book alone
    let response = client
        .update_book(&harry_id, &json!({"year": 2000, "pageCount": 1, "readPage": 1}))
        .await?;
    assert_fail(response, 400, "Failed to update book. Please provide the book name").await?;

    let response = client
        .update_book(&harry_id, &json!({"name": "Too far", "pageCount": 1, "readPage": 2}))
        .await?;
    assert_fail(
        response,
        400,
        "Failed to update book. readPage must not be greater than pageCount",
    )
    .await?;
    assert_eq!(updated, client.get_book(&harry_id).await?);

    // Update a non-existent book
    let response = client
        .update_book("no-such-book", &book("Ghost", 10, 1, true))
        .await?;
    assert_fail(response, 404, "Failed to update book. Id not found").await?;

    // Delete a book
    let response = client.delete_book(&harry_id).await?;
    assert_eq!(200, response.status().as_u16());
    let body = response.json::<Value>().await?;
    assert_eq!(
        json!({"status": "success", "message": "Book deleted successfully"}),
        body
    );

    let response = client.get_book_raw(&harry_id).await?;
    assert_fail(response, 404, "Book not found").await?;
    let books = client.list_books(&[]).await?;
    assert_eq!(2, books["data"]["books"].as_array().unwrap().len());

    // The other books are still there
    assert_eq!(finished, client.get_book(&finished_id).await?);

    // Delete a non-existent book
    let response = client.delete_book(&harry_id).await?;
    assert_fail(response, 404, "Failed to delete book. Id not found").await?;

    Ok(())
}

#[tokio::test]
async fn bookshelf_api_integration_test() {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
    };

    // Run the HTTP server in the background, so we can run tests against it
    let (addr, server) = start_server(&config).await.unwrap();
    tokio::spawn(async move {
        server.await.unwrap();
    });

    run_tests(BookClient::new(addr)).await.unwrap();
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let (addr, server) = start_server(&config).await.unwrap();
    tokio::spawn(async move {
        server.await.unwrap();
    });

    let response = reqwest::Client::new()
        .get(format!("http://{addr}/books"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        "*",
        response.headers()["access-control-allow-origin"]
    );
}
