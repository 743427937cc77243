//! Paged list retrieval
//!
//! The v4 list endpoints page with `$page`/`$limit`. The loop requests
//! consecutive pages and stops as soon as a page comes back with fewer
//! items than the limit (including an empty first page).

use anyhow::Result;
use serde_json::Value;

use super::client::PrismClient;

/// Fetch every page of a list endpoint and concatenate the `data` arrays
/// in page order.
pub async fn fetch_all_pages(
    client: &PrismClient,
    path: &str,
    limit: usize,
) -> Result<Vec<Value>> {
    let items = collect_pages(limit, |page| client.get_page(path, page, limit)).await?;
    log::info!("{}: fetched {} items", path, items.len());
    Ok(items)
}

/// Drive the page loop over any page source. Pages are requested from 0
/// upward; a page with fewer than `limit` items is the last one.
async fn collect_pages<F, Fut>(limit: usize, mut fetch: F) -> Result<Vec<Value>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let mut items = Vec::new();
    let mut page = 0;

    loop {
        let body = fetch(page).await?;
        let page_items = page_items(&body);
        let count = page_items.len();
        items.extend(page_items);

        log::debug!("page {} returned {} items", page, count);
        if count < limit {
            break;
        }
        page += 1;
    }

    Ok(items)
}

/// Extract the `data` array from a list response body. A missing or
/// non-array `data` field reads as an empty page, which terminates the loop.
pub fn page_items(body: &Value) -> Vec<Value> {
    body.get("data")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_of(ids: &[&str]) -> Value {
        let data: Vec<Value> = ids.iter().map(|id| json!({ "extId": id })).collect();
        json!({ "data": data, "metadata": {} })
    }

    #[test]
    fn page_items_reads_data_array() {
        let body = json!({ "data": [{"extId": "a"}, {"extId": "b"}], "metadata": {} });
        assert_eq!(page_items(&body).len(), 2);
    }

    #[test]
    fn missing_data_field_is_an_empty_page() {
        assert!(page_items(&json!({ "metadata": {} })).is_empty());
        assert!(page_items(&json!({ "data": null })).is_empty());
    }

    #[tokio::test]
    async fn short_page_ends_the_loop_and_pages_concatenate_in_order() {
        let bodies = vec![
            page_of(&["a", "b"]),
            page_of(&["c", "d"]),
            page_of(&["e"]),
        ];

        let items = collect_pages(2, |page| {
            let body = bodies[page].clone();
            async move { Ok(body) }
        })
        .await
        .unwrap();

        let ids: Vec<&str> = items
            .iter()
            .map(|item| item["extId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn full_final_page_requests_one_more() {
        // Two full pages, then an empty one: the loop must probe page 2.
        let bodies = vec![page_of(&["a", "b"]), page_of(&["c", "d"]), page_of(&[])];
        let mut requested = Vec::new();

        let items = collect_pages(2, |page| {
            requested.push(page);
            let body = bodies[page].clone();
            async move { Ok(body) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 4);
        assert_eq!(requested, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn empty_first_page_terminates_immediately() {
        let mut calls = 0;
        let items = collect_pages(100, |_page| {
            calls += 1;
            async { Ok(json!({ "data": [], "metadata": {} })) }
        })
        .await
        .unwrap();

        assert!(items.is_empty());
        assert_eq!(calls, 1);
    }
}
