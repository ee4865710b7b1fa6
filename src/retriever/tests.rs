use super::*;
use crate::embedding::TokenEmbeddings;
use crate::expiry::ClearStatus;
use crate::retrieval::ScoringError;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;

fn retriever() -> Retriever {
    Retriever::new(RetrieverConfig::small()).unwrap()
}

fn docs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| t.to_string()).collect()
}

fn about(value: &str) -> Metadata {
    json!({ "about": value }).as_object().cloned().unwrap()
}

const GHIBLI: [&str; 3] = [
    "Hayao Miyazaki co-founded Studio Ghibli and directed My Neighbor Totoro.",
    "Spirited Away won the Academy Award for Best Animated Feature.",
    "Toshio Suzuki produced most of the studio's feature films.",
];

#[tokio::test]
async fn three_documents_with_metadata() {
    let r = retriever();
    r.encode(docs(&GHIBLI), Some(vec![about("x"), about("x"), about("x")]))
        .await
        .unwrap();

    let results = r.search_encoded_docs("who directed totoro", 3).await.unwrap();
    assert_eq!(results.len(), 3);
    let indices: HashSet<_> = results.iter().map(|res| res.result_index).collect();
    assert_eq!(indices, HashSet::from([0, 1, 2]));
    for res in &results {
        assert_eq!(res.document_metadata, Some(about("x")));
    }
}

#[tokio::test]
async fn most_relevant_document_ranks_first() {
    let r = retriever();
    r.encode(docs(&GHIBLI), None).await.unwrap();

    let results = r
        .search_encoded_docs("Miyazaki directed Totoro", 3)
        .await
        .unwrap();
    assert_eq!(results[0].result_index, 0);
    assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    for (pos, res) in results.iter().enumerate() {
        assert_eq!(res.rank, pos);
    }
}

#[tokio::test]
async fn store_size_is_sum_of_encoded_batches() {
    let r = retriever();
    let first = r.encode(docs(&GHIBLI[..2]), None).await.unwrap();
    let second = r.encode(docs(&GHIBLI[2..]), None).await.unwrap();
    assert_eq!(first.first_index, 0);
    assert_eq!(second.first_index, 2);
    assert_eq!(r.len().await, 3);

    assert!(matches!(
        r.clear_encoded_docs(true).await,
        ClearOutcome::Cleared { removed: 3 }
    ));
    assert_eq!(r.len().await, 0);

    let again = r.encode(docs(&GHIBLI[..1]), None).await.unwrap();
    assert_eq!(again.first_index, 0);
}

#[tokio::test]
async fn k_is_clipped_to_store_size() {
    let r = retriever();
    r.encode(docs(&GHIBLI[..2]), None).await.unwrap();
    assert_eq!(r.search_encoded_docs("ghibli", 10).await.unwrap().len(), 2);
    assert_eq!(r.search_encoded_docs("ghibli", 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn zero_k_is_an_error() {
    let r = retriever();
    let err = r.search_encoded_docs("ghibli", 0).await.unwrap_err();
    assert!(matches!(err, RetrievalError::Scoring(ScoringError::InvalidK)));
}

#[tokio::test]
async fn empty_store_search_is_empty() {
    let r = retriever();
    assert!(r.search_encoded_docs("anything", 5).await.unwrap().is_empty());
    // the query is not even encoded when there is nothing to score
    assert!(r.search_encoded_docs("   ", 5).await.unwrap().is_empty());
}

#[tokio::test]
async fn tokenless_query_returns_every_document_in_insertion_order() {
    let r = retriever();
    r.encode(docs(&GHIBLI), None).await.unwrap();

    for query in ["", "   \n"] {
        let results = r.search_encoded_docs(query, 2).await.unwrap();
        let indices: Vec<_> = results.iter().map(|res| res.result_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert!(results.iter().all(|res| res.score == 0.0));
        assert_eq!(results[1].rank, 1);
    }
    assert_eq!(r.search_encoded_docs("", 10).await.unwrap().len(), 3);
}

#[tokio::test]
async fn metadata_mismatch_is_rejected_without_side_effects() {
    let r = retriever();
    let err = r
        .encode(docs(&GHIBLI), Some(vec![about("x")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::MetadataLengthMismatch {
            documents: 3,
            metadatas: 1
        }
    ));
    assert!(r.is_empty().await);
}

#[tokio::test]
async fn empty_document_fails_the_whole_batch() {
    let r = retriever();
    let err = r.encode(docs(&["fine", "\n"]), None).await.unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::Encoder(EncoderError::EmptyInput { index: 1 })
    ));
    assert!(r.is_empty().await);
}

#[tokio::test]
async fn empty_encode_is_a_no_op() {
    let r = retriever();
    let summary = r.encode(Vec::new(), None).await.unwrap();
    assert_eq!(summary.added, 0);
    assert!(r.is_empty().await);
}

#[tokio::test]
async fn forced_clear_empties_search_results() {
    let r = retriever();
    r.encode(docs(&GHIBLI), None).await.unwrap();
    r.clear_encoded_docs(true).await;
    assert!(r.search_encoded_docs("Totoro", 3).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn delayed_clear_keeps_docs_searchable_until_deadline() {
    let r = retriever();
    r.encode(docs(&GHIBLI), None).await.unwrap();

    let pending = match r.clear_encoded_docs(false).await {
        ClearOutcome::Scheduled(p) => p,
        other => panic!("expected a countdown, got {other:?}"),
    };
    assert!(r.pending_clear().is_some());

    tokio::time::advance(Duration::from_secs(9)).await;
    assert_eq!(r.search_encoded_docs("Totoro", 3).await.unwrap().len(), 3);

    assert_eq!(pending.wait().await, ClearStatus::Completed { removed: 3 });
    assert!(r.search_encoded_docs("Totoro", 3).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_countdown() {
    let r = retriever();
    r.encode(docs(&GHIBLI), None).await.unwrap();
    let pending = match r.clear_encoded_docs(false).await {
        ClearOutcome::Scheduled(p) => p,
        other => panic!("expected a countdown, got {other:?}"),
    };

    r.shutdown();
    assert_eq!(pending.wait().await, ClearStatus::Cancelled);
    assert_eq!(r.len().await, 3);
}

#[tokio::test]
async fn snapshot_taken_before_clear_is_still_scored() {
    let r = retriever();
    r.encode(docs(&GHIBLI), None).await.unwrap();
    let before = r.snapshot().await;
    r.clear_encoded_docs(true).await;

    let query = r.encoder.encode_query("Totoro").await.unwrap();
    let results = retrieval::search(&query, &before, 3).unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn clones_share_the_store_across_tasks() {
    let r = retriever();
    let writer = r.clone();
    tokio::spawn(async move { writer.encode(docs(&GHIBLI), None).await })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r.len().await, 3);
}

#[tokio::test]
async fn max_tokens_truncates_long_documents() {
    let mut config = RetrieverConfig::small();
    config.encoder.model_max_tokens = 4;
    config.encoder.min_inference_tokens = 4;
    let r = Retriever::new(config).unwrap();

    let summary = r
        .encode(docs(&["one two three four five six seven"]), None)
        .await
        .unwrap();
    assert_eq!(summary.max_tokens, 4);
    assert_eq!(r.snapshot().await.get(0).unwrap().embedding.len(), 4);
}

struct ShortEncoder {
    config: crate::config::EncoderConfig,
}

#[async_trait]
impl Encoder for ShortEncoder {
    fn config(&self) -> &crate::config::EncoderConfig {
        &self.config
    }

    async fn encode_documents(
        &self,
        _texts: &[String],
        _max_tokens: usize,
    ) -> std::result::Result<Vec<TokenEmbeddings>, EncoderError> {
        Ok(Vec::new())
    }

    async fn encode_query(&self, _query: &str) -> std::result::Result<TokenEmbeddings, EncoderError> {
        TokenEmbeddings::with_dim(self.config.dim)
    }
}

#[tokio::test]
async fn encoder_returning_too_few_matrices_is_an_error() {
    let encoder = Arc::new(ShortEncoder {
        config: Default::default(),
    });
    let r = Retriever::with_encoder(RetrieverConfig::default(), encoder).unwrap();
    let err = r.encode(docs(&GHIBLI), None).await.unwrap_err();
    assert!(matches!(
        err,
        RetrievalError::Encoder(EncoderError::EncodingFailed { .. })
    ));
    assert!(r.is_empty().await);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = RetrieverConfig::default();
    config.encoder.batch_size = 0;
    assert!(matches!(
        Retriever::new(config),
        Err(RetrievalError::Config(_))
    ));
}
