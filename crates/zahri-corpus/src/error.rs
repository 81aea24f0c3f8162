use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("article {0} not found")]
    ArticleNotFound(u64),
    #[error("newspaper {0} not found")]
    NewspaperNotFound(u64),
    #[error("article {article} references unknown newspaper {newspaper}")]
    UnknownNewspaper { article: u64, newspaper: u64 },
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u64 },
    #[error("selected text not found in article {0}")]
    SelectionNotFound(u64),
}
