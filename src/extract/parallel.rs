use std::path::PathBuf;

use anyhow::Result;
use futures::{stream, StreamExt};
use log::info;

use crate::{chains::Chain, files, models::RawTransactionRecord};

use super::{
    client::{ExplorerClient, TransactionQuery},
    paginator::PaginatedFetcher,
};

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_CHECKPOINT_EVERY: usize = 500;
pub const PROGRESS_EVERY: usize = 100;
pub const TX_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct WalletExtraction {
    pub transactions: Vec<RawTransactionRecord>,
    pub wallets: usize,
    pub wallets_with_transactions: usize,
    pub incomplete_wallets: usize,
    pub checkpoints: usize,
}

/// Transaction history of many wallets, a bounded number in flight at once.
/// Results arrive in completion order.
pub struct ParallelAddressFetcher<'a> {
    client: &'a ExplorerClient,
    chain: Chain,
    start_block: u64,
    end_block: u64,
    concurrency: usize,
    checkpoint_every: usize,
    checkpoint_path: Option<PathBuf>,
}

impl<'a> ParallelAddressFetcher<'a> {
    pub fn new(client: &'a ExplorerClient, chain: Chain, start_block: u64, end_block: u64) -> Self {
        Self {
            client,
            chain,
            start_block,
            end_block,
            concurrency: DEFAULT_CONCURRENCY,
            checkpoint_every: DEFAULT_CHECKPOINT_EVERY,
            checkpoint_path: None,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Snapshot of everything fetched so far, replaced every
    /// `checkpoint_every` wallets and once more at the end.
    pub fn with_checkpoint(mut self, path: PathBuf, checkpoint_every: usize) -> Self {
        self.checkpoint_path = Some(path);
        self.checkpoint_every = checkpoint_every.max(1);
        self
    }

    pub async fn run(&self, wallets: &[String]) -> Result<WalletExtraction> {
        let total = wallets.len();

        info!(
            "Extracting {} transactions for {} wallets, blocks {} -> {} with {} workers",
            self.chain, total, self.start_block, self.end_block, self.concurrency
        );

        let fetcher = PaginatedFetcher::new(self.client, TX_MAX_ATTEMPTS);
        let fetcher = &fetcher;

        let chain = self.chain;
        let start_block = self.start_block;
        let end_block = self.end_block;

        let mut results = stream::iter(wallets)
            .map(|wallet| async move {
                let query = TransactionQuery {
                    chain,
                    address: wallet.clone(),
                    start_block,
                    end_block,
                };

                let fetched = fetcher.fetch::<RawTransactionRecord>(&query).await;

                (wallet, fetched)
            })
            .buffer_unordered(self.concurrency);

        let mut extraction = WalletExtraction {
            wallets: total,
            ..Default::default()
        };

        let mut processed = 0;

        while let Some((wallet, fetched)) = results.next().await {
            processed += 1;

            if !fetched.is_complete() {
                extraction.incomplete_wallets += 1;
            }

            if !fetched.records.is_empty() {
                extraction.wallets_with_transactions += 1;

                extraction
                    .transactions
                    .extend(fetched.records.into_iter().map(|mut record| {
                        record.wallet = Some(wallet.clone());
                        record
                    }));
            }

            if processed % PROGRESS_EVERY == 0 || processed == total {
                info!(
                    "[{}/{}] wallets processed | {} txs | {} active",
                    processed,
                    total,
                    extraction.transactions.len(),
                    extraction.wallets_with_transactions
                );
            }

            if processed % self.checkpoint_every == 0 && processed != total {
                self.checkpoint(&mut extraction)?;
            }
        }

        self.checkpoint(&mut extraction)?;

        info!(
            "Fetched {} transactions from {} active wallets ({} incomplete)",
            extraction.transactions.len(),
            extraction.wallets_with_transactions,
            extraction.incomplete_wallets
        );

        Ok(extraction)
    }

    fn checkpoint(&self, extraction: &mut WalletExtraction) -> Result<()> {
        let Some(path) = &self.checkpoint_path else {
            return Ok(());
        };

        files::write_records(path, &extraction.transactions)?;
        extraction.checkpoints += 1;

        info!(
            "Checkpoint saved: {} rows to {}",
            extraction.transactions.len(),
            path.display()
        );

        Ok(())
    }
}
