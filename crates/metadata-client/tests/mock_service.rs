//! Client tests against the mock metadata service on a random local port.

use std::sync::Arc;
use std::time::Duration;

use data_loader::{GenreDetails, GenreTable, LanguageTable};
use metadata_client::test_util::{MockMetadataService, query_param};
use metadata_client::{DiscoverFilter, DiscoverSort, MetadataClient, MetadataConfig, MetadataError};

fn client(service: &MockMetadataService) -> MetadataClient {
    let languages: LanguageTable = [("en", "English"), ("fr", "French")].into_iter().collect();
    let genres = GenreTable::new(vec![GenreDetails {
        id: 28,
        name: "Action".to_string(),
    }]);
    let config = MetadataConfig::new("test-key")
        .with_api_url(service.url())
        .with_timeout(Duration::from_millis(500));
    MetadataClient::new(config, Arc::new(languages), Arc::new(genres)).unwrap()
}

async fn start() -> (MockMetadataService, MetadataClient) {
    let service = MockMetadataService::start().await.unwrap();
    let client = client(&service);
    (service, client)
}

#[tokio::test]
async fn test_known_movie_is_mapped() {
    let (service, client) = start().await;

    let details = client.movie_details(42).await.unwrap().unwrap();
    assert_eq!(details.movie_id, 42);
    assert_eq!(details.title, "Movie 42");
    assert_eq!(details.genres, vec!["Action"]);
    assert_eq!(details.language, "English");

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("/movie/42?"));
    assert_eq!(query_param(&requests[0], "api_key"), Some("test-key"));
}

#[tokio::test]
async fn test_not_found_is_none() {
    let (_service, client) = start().await;
    assert!(client.movie_details(404).await.unwrap().is_none());
}

#[tokio::test]
async fn test_server_error_is_unexpected_status() {
    let (_service, client) = start().await;

    let err = client.movie_details(500).await.unwrap_err();
    assert!(matches!(
        err,
        MetadataError::UnexpectedStatus { ref resource, status: 500 } if resource == "movie 500"
    ));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let (_service, client) = start().await;

    let err = client.movie_details(900).await.unwrap_err();
    assert!(matches!(
        err,
        MetadataError::Transport { ref resource, .. } if resource == "movie 900"
    ));
}

#[tokio::test]
async fn test_batch_keeps_order_and_failed_ids() {
    let (_service, client) = start().await;

    let results = client.movie_details_batch(&[3, 500, 1, 404]).await;
    let ids: Vec<u32> = results.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![3, 500, 1, 404]);

    assert_eq!(results[0].1.as_ref().unwrap().title, "Movie 3");
    assert!(results[1].1.is_none());
    assert_eq!(results[2].1.as_ref().unwrap().title, "Movie 1");
    assert!(results[3].1.is_none());
}

#[tokio::test]
async fn test_trending_keeps_top_ten() {
    let (service, client) = start().await;

    let cards = client.trending().await.unwrap();
    let ids: Vec<u32> = cards.iter().map(|c| c.movie_id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    assert_eq!(cards[0].genres, vec!["Action"]);
    assert_eq!(cards[0].language, "English");

    assert!(service.requests()[0].starts_with("/trending/movie/week?"));
}

#[tokio::test]
async fn test_discover_walks_pages_up_to_limit() {
    let (service, client) = start().await;

    let filter = DiscoverFilter {
        limit: 45,
        ..Default::default()
    };
    let cards = client.discover(&filter).await.unwrap();
    assert_eq!(cards.len(), 45);
    assert_eq!(cards[0].movie_id, 1);
    assert_eq!(cards[44].movie_id, 45);

    let requests = service.requests();
    let pages: Vec<&str> = requests.iter().filter_map(|r| query_param(r, "page")).collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_discover_stops_at_last_page() {
    let (service, client) = start().await;

    let filter = DiscoverFilter {
        limit: 100,
        sort: DiscoverSort::Popularity,
        ..Default::default()
    };
    let cards = client.discover(&filter).await.unwrap();
    assert_eq!(cards.len(), 60);
    assert_eq!(service.requests().len(), MockMetadataService::LIST_PAGES as usize);
}

#[tokio::test]
async fn test_discover_sends_filters() {
    let (service, client) = start().await;

    let filter = DiscoverFilter {
        genres: vec![28, 12],
        release_year: Some(2010),
        min_vote: Some(7.5),
        sort: DiscoverSort::Latest,
        language: Some(" english ".to_string()),
        limit: 5,
    };
    assert_eq!(client.discover(&filter).await.unwrap().len(), 5);

    let requests = service.requests();
    assert_eq!(requests.len(), 1);
    let target = requests[0].as_str();
    assert!(target.starts_with("/discover/movie?"));
    assert_eq!(query_param(target, "sort_by"), Some("release_date.desc"));
    assert_eq!(query_param(target, "with_genres"), Some("28%2C12"));
    assert_eq!(query_param(target, "primary_release_year"), Some("2010"));
    assert_eq!(query_param(target, "vote_average.gte"), Some("7.5"));
    assert_eq!(query_param(target, "with_original_language"), Some("en"));
    assert_eq!(query_param(target, "page"), Some("1"));
    assert!(query_param(target, "primary_release_date.lte").is_some());
}

#[tokio::test]
async fn test_discover_by_popularity_has_no_date_bound() {
    let (service, client) = start().await;

    let filter = DiscoverFilter {
        sort: DiscoverSort::Popularity,
        ..Default::default()
    };
    client.discover(&filter).await.unwrap();

    let target = &service.requests()[0];
    assert_eq!(query_param(target, "sort_by"), Some("popularity.desc"));
    assert!(query_param(target, "primary_release_date.lte").is_none());
    assert!(query_param(target, "with_original_language").is_none());
}

#[tokio::test]
async fn test_discover_unknown_language_errors_before_request() {
    let (service, client) = start().await;

    let filter = DiscoverFilter {
        language: Some("Klingon".to_string()),
        ..Default::default()
    };
    let err = client.discover(&filter).await.unwrap_err();
    assert!(matches!(err, MetadataError::UnknownLanguage(ref name) if name == "Klingon"));
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn test_search_paginates() {
    let (service, client) = start().await;

    let cards = client.search("heat", 25).await.unwrap();
    assert_eq!(cards.len(), 25);
    assert_eq!(cards[24].movie_id, 25);

    let requests = service.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests.iter().all(|r| r.starts_with("/search/movie?")));
    assert_eq!(query_param(&requests[0], "query"), Some("heat"));
    assert_eq!(query_param(&requests[0], "include_adult"), Some("false"));
    assert_eq!(query_param(&requests[1], "page"), Some("2"));
}

#[tokio::test]
async fn test_search_without_results() {
    let (service, client) = start().await;

    assert!(client.search("nothing", 50).await.unwrap().is_empty());
    // An empty first page ends the walk
    assert_eq!(service.requests().len(), 1);
}

#[tokio::test]
async fn test_search_rejects_blank_query_and_bad_limit() {
    let (service, client) = start().await;

    assert!(matches!(
        client.search("   ", 10).await,
        Err(MetadataError::InvalidInput(_))
    ));
    assert!(matches!(
        client.search("heat", 0).await,
        Err(MetadataError::InvalidInput(_))
    ));
    assert!(service.requests().is_empty());
}
