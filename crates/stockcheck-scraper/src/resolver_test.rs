use super::*;

#[test]
fn finds_id_in_product_path() {
    let html = r#"<div data-href="/tr/tr/keten-gomlek-p04786211.html?v1=333">Keten</div>"#;
    assert_eq!(find_product_id(html).as_deref(), Some("04786211"));
}

#[test]
fn first_product_path_wins() {
    let html = r#"<a href="/tr/tr/a-p11111111.html"></a><a href="/tr/tr/b-p22222222.html"></a>"#;
    assert_eq!(find_product_id(html).as_deref(), Some("11111111"));
}

#[test]
fn finds_id_in_next_data_blob() {
    let html = r#"<html><body><script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"results":[{"productId": "20230010","name":"Tee"}]}}}</script></body></html>"#;
    assert_eq!(find_product_id(html).as_deref(), Some("20230010"));
}

#[test]
fn next_data_numeric_id_without_quotes() {
    let html = r#"<script id='__NEXT_DATA__'>{"seoProductId":305123456}</script>"#;
    assert_eq!(find_product_id(html).as_deref(), Some("305123456"));
}

#[test]
fn product_id_outside_next_data_is_ignored_by_blob_scan() {
    let html = r#"<script>var x = {"productId":"12345678"};</script>"#;
    assert_eq!(find_product_id(html), None);
}

#[test]
fn finds_id_in_anchor_without_slug() {
    let html = r#"<ul><li><a href="/tr/tr/p00526310.html?v1=1">Shirt</a></li></ul>"#;
    assert_eq!(find_product_id(html).as_deref(), Some("00526310"));
}

#[test]
fn short_numbers_are_not_product_ids() {
    let html = r#"<a href="/tr/tr/help-p12.html">Help</a><a href="/tr/tr/p123.html">x</a>"#;
    assert_eq!(find_product_id(html), None);
}

#[test]
fn no_match_returns_none() {
    assert_eq!(find_product_id("<html><body>No results</body></html>"), None);
    assert_eq!(find_product_id(""), None);
}
