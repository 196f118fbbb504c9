/// JSON-RPC Common
pub mod common;

/// HTTP Transport
pub mod http;

/// Node API types
pub mod rpc_types;

use async_trait::async_trait;
use caminos::{
    select::{SpendRequest, SpendResponse, SpendRpc},
    types::{Id, Tx, Utxo, UtxoSet},
    CaminoResult,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    provider::*,
    rpc::{common::*, http::HttpTransport, rpc_types::*},
};

/// The most UTXOs a node returns per `getUTXOs` page
pub const UTXO_PAGE_LIMIT: u32 = 1024;

/// A connection to one platform-style chain of a node: the P-chain (namespace `platform`) or
/// the touristic T-chain (namespace `touristicvm`).
#[derive(Debug)]
pub struct PlatformRpc<T: JsonRpcTransport> {
    transport: T,
    namespace: String,
}

impl PlatformRpc<HttpTransport> {
    /// Connect to the P-chain of the node at `url`
    pub fn platform(url: &str) -> Self {
        Self::new(HttpTransport::new(url, "P"), "platform")
    }

    /// Connect to the touristic T-chain of the node at `url`
    pub fn touristic(url: &str) -> Self {
        Self::new(HttpTransport::new(url, "T"), "touristicvm")
    }
}

impl<T: JsonRpcTransport> PlatformRpc<T> {
    /// Wrap a transport. Chain methods are called as `<namespace>.<method>`.
    pub fn new(transport: T, namespace: &str) -> Self {
        Self {
            transport,
            namespace: namespace.to_owned(),
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn request<P, R>(&self, method: &str, params: P) -> ProviderResult<R>
    where
        P: Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let method = format!("{}.{}", self.namespace, method);
        self.transport.request(&method, params).await
    }

    /// Run the node's coin selection. See `caminos::select::Spender`.
    #[tracing::instrument(skip_all, err, fields(namespace = %self.namespace))]
    pub async fn spend(&self, request: SpendRequest) -> ProviderResult<SpendResponse> {
        self.request("spend", request).await
    }

    /// Fetch one page of UTXOs owned by `addresses`. Pass `source_chain` to fetch atomic UTXOs
    /// exported from that chain.
    pub async fn get_utxos(
        &self,
        addresses: &[String],
        source_chain: Option<&str>,
        start_index: Option<UtxoIndex>,
    ) -> ProviderResult<(Vec<Utxo>, UtxoIndex)> {
        let params = GetUtxosParams {
            addresses: addresses.to_vec(),
            source_chain: source_chain.map(ToOwned::to_owned),
            limit: Some(UTXO_PAGE_LIMIT),
            start_index,
            encoding: "hex".to_owned(),
        };
        let res: GetUtxosResponse = self.request("getUTXOs", params).await?;
        if res.utxos.len() as u64 != res.num_fetched {
            return Err(ProviderError::Unexpected(format!(
                "numFetched is {} but {} UTXOs were returned",
                res.num_fetched,
                res.utxos.len()
            )));
        }
        let utxos = res
            .utxos
            .iter()
            .map(|s| Utxo::from_string(s))
            .collect::<CaminoResult<Vec<_>>>()?;
        Ok((utxos, res.end_index))
    }

    /// Fetch every UTXO owned by `addresses`, following pagination, in the order the node
    /// returns them.
    #[tracing::instrument(skip_all, err, fields(addresses = addresses.len()))]
    pub async fn get_utxo_set(
        &self,
        addresses: &[String],
        source_chain: Option<&str>,
    ) -> ProviderResult<UtxoSet> {
        let mut set = UtxoSet::new();
        let mut cursor = None;
        loop {
            let (page, end) = self.get_utxos(addresses, source_chain, cursor).await?;
            let fetched = page.len();
            set.add_array(page, false);
            tracing::debug!(fetched, total = set.len(), "fetched utxo page");
            if fetched < UTXO_PAGE_LIMIT as usize {
                return Ok(set);
            }
            cursor = Some(end);
        }
    }

    /// Submit a signed transaction. Returns its ID as accepted by the node.
    #[tracing::instrument(skip_all, err)]
    pub async fn issue_tx(&self, tx: &Tx) -> ProviderResult<Id> {
        let params = IssueTxParams {
            tx: tx.to_hex_checksummed()?,
            encoding: "hex".to_owned(),
        };
        let res: IssueTxResponse = self.request("issueTx", params).await?;
        let local = tx.id()?;
        if res.tx_id != local {
            tracing::warn!(node = %res.tx_id, local = %local, "node reported a different tx id");
        }
        Ok(res.tx_id)
    }

    /// The node's base transaction fee
    pub async fn get_tx_fee(&self) -> ProviderResult<u64> {
        let res: GetTxFeeResponse = self
            .transport
            .request("info.getTxFee", serde_json::json!({}))
            .await?;
        Ok(res.tx_fee)
    }

    /// Resolve a chain alias to its blockchain ID
    pub async fn get_blockchain_id(&self, alias: &str) -> ProviderResult<Id> {
        let params = GetBlockchainIdParams {
            alias: alias.to_owned(),
        };
        let res: GetBlockchainIdResponse = self
            .transport
            .request("info.getBlockchainID", params)
            .await?;
        Ok(res.blockchain_id)
    }
}

#[async_trait]
impl<T: JsonRpcTransport> SpendRpc for PlatformRpc<T> {
    async fn spend(&self, request: SpendRequest) -> CaminoResult<SpendResponse> {
        Ok(PlatformRpc::spend(self, request).await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use caminos::{
        chain::ChainContext,
        errors::CaminoError,
        nets::Kopernikus,
        select::{AssetAmountDestination, LockMode, MinimumSpendable, Spender},
        types::{
            BaseTx, Input, Output, OutputOwners, ShortId, Transaction, TransferableInput,
            TransferableOutput, UnsignedTx, SECP_TRANSFER_INPUT_ID, SECP_TRANSFER_OUTPUT_ID,
        },
    };
    use camino_core::{enc::encode_hex_checksummed, ser::write_codec_seq};
    use serde_json::{json, Value};
    use std::{
        collections::HashMap,
        sync::{atomic::AtomicU64, Mutex},
    };

    const AVAX: Id = Id::new([0xaa; 32]);

    /// Answers from canned JSON-RPC responses and records every call.
    #[derive(Default)]
    struct FakeTransport {
        id: AtomicU64,
        responses: HashMap<String, Value>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl FakeTransport {
        fn with(mut self, method: &str, result: Value) -> Self {
            self.responses.insert(
                method.to_owned(),
                json!({"jsonrpc": "2.0", "id": 0, "result": result}),
            );
            self
        }

        fn with_error(mut self, method: &str, message: &str) -> Self {
            self.responses.insert(
                method.to_owned(),
                json!({"jsonrpc": "2.0", "id": 0, "error": {"code": -32000, "message": message}}),
            );
            self
        }
    }

    #[async_trait]
    impl JsonRpcTransport for FakeTransport {
        fn id(&self) -> &AtomicU64 {
            &self.id
        }

        async fn request<P, R>(&self, method: &str, params: P) -> Result<R, ProviderError>
        where
            P: Serialize + Send + Sync,
            R: DeserializeOwned,
        {
            self.next_id();
            self.calls
                .lock()
                .unwrap()
                .push((method.to_owned(), serde_json::to_value(&params)?));
            let canned = self
                .responses
                .get(method)
                .cloned()
                .ok_or_else(|| ProviderError::Unexpected(format!("no response for {}", method)))?;
            let res: Response<R> = serde_json::from_value(canned)?;
            Ok(res.data.into_result()?)
        }
    }

    fn addr(b: u8) -> ShortId {
        ShortId::new([b; 20])
    }

    fn utxo(tx: u8, amount: u64) -> Utxo {
        Utxo::new(
            Id::new([tx; 32]),
            0,
            AVAX,
            Output::select(SECP_TRANSFER_OUTPUT_ID, amount, vec![addr(1)], 0, 1).unwrap(),
        )
    }

    #[tokio::test]
    async fn it_fetches_and_parses_utxos() {
        let a = utxo(1, 10);
        let b = utxo(2, 20);
        let transport = FakeTransport::default().with(
            "platform.getUTXOs",
            json!({
                "numFetched": "2",
                "utxos": [a.to_hex_checksummed().unwrap(), b.to_cb58().unwrap()],
                "endIndex": {"address": "P-kopernikus1xyz", "utxo": b.utxo_id()},
                "encoding": "hex"
            }),
        );
        let rpc = PlatformRpc::new(transport, "platform");
        let set = rpc
            .get_utxo_set(&["P-kopernikus1xyz".to_owned()], None)
            .await
            .unwrap();
        assert_eq!(set.get_all(), &[a, b]);

        let calls = rpc.transport().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "platform.getUTXOs");
        assert_eq!(calls[0].1["limit"], 1024);
        assert!(calls[0].1.get("sourceChain").is_none());
    }

    #[tokio::test]
    async fn it_rejects_inconsistent_utxo_pages() {
        let transport = FakeTransport::default().with(
            "platform.getUTXOs",
            json!({"numFetched": "3", "utxos": [], "endIndex": {"address": "", "utxo": ""}}),
        );
        let rpc = PlatformRpc::new(transport, "platform");
        let err = rpc.get_utxos(&[], Some("X"), None).await.unwrap_err();
        assert!(err.from_parsing());
    }

    #[tokio::test]
    async fn it_looks_up_fees_and_chains_on_info() {
        let chain = Id::new([0xcc; 32]);
        let transport = FakeTransport::default()
            .with("info.getTxFee", json!({"txFee": "1000000"}))
            .with("info.getBlockchainID", json!({"blockchainID": chain.to_cb58()}));
        let rpc = PlatformRpc::new(transport, "touristicvm");
        assert_eq!(rpc.get_tx_fee().await.unwrap(), 1_000_000);
        assert_eq!(rpc.get_blockchain_id("T").await.unwrap(), chain);
        let calls = rpc.transport().calls.lock().unwrap();
        assert_eq!(calls[1].1, json!({"alias": "T"}));
    }

    #[tokio::test]
    async fn it_issues_transactions() {
        let mut input = Input::select(SECP_TRANSFER_INPUT_ID, 10).unwrap();
        input.add_signature_idx(0, addr(1));
        let base = BaseTx::new(
            1002,
            Id::zero(),
            vec![],
            vec![TransferableInput::new(Id::new([1; 32]), 0, AVAX, input)],
            vec![],
        )
        .unwrap();
        let tx = UnsignedTx::new(Transaction::Base(base))
            .with_placeholder_credentials();
        let id = tx.id().unwrap();

        let transport =
            FakeTransport::default().with("platform.issueTx", json!({"txID": id.to_cb58()}));
        let rpc = PlatformRpc::new(transport, "platform");
        assert_eq!(rpc.issue_tx(&tx).await.unwrap(), id);
        let calls = rpc.transport().calls.lock().unwrap();
        assert_eq!(calls[0].1["tx"], tx.to_hex_checksummed().unwrap());
        assert_eq!(calls[0].1["encoding"], "hex");
    }

    #[tokio::test]
    async fn it_serves_remote_selection() {
        let mut input = Input::select(SECP_TRANSFER_INPUT_ID, 5000).unwrap();
        input.add_signature_idx(0, ShortId::zero());
        let ins = vec![TransferableInput::new(Id::new([1; 32]), 0, AVAX, input)];
        let outs = vec![TransferableOutput::new(
            AVAX,
            Output::select(SECP_TRANSFER_OUTPUT_ID, 4000, vec![addr(1)], 0, 1).unwrap(),
        )];
        let owners: Vec<OutputOwners> = vec![];
        let transport = FakeTransport::default().with(
            "touristicvm.spend",
            json!({
                "ins": encode_hex_checksummed(&write_codec_seq(&ins).unwrap()),
                "outs": encode_hex_checksummed(&write_codec_seq(&outs).unwrap()),
                "owners": encode_hex_checksummed(&write_codec_seq(&owners).unwrap()),
                "signers": [[addr(1).to_cb58()]],
                "encoding": "hex"
            }),
        );
        let context = ChainContext::for_network::<Kopernikus>("T", Id::zero(), AVAX, 1000);
        let spender = Spender::new(PlatformRpc::new(transport, "touristicvm"), context);

        let mut aad =
            AssetAmountDestination::new(vec![addr(1)], 1, vec![addr(1)], vec![addr(1)], 1);
        aad.add_asset_amount(AVAX, 4000, 1000);
        let aad = spender
            .get_minimum_spendable(aad, 0, 0, LockMode::Deposit, None)
            .await
            .unwrap();
        assert_eq!(aad.inputs()[0].input.sig_indices()[0].source, addr(1));
        assert_eq!(aad.outputs().len(), 1);

        let calls = spender.rpc().transport().calls.lock().unwrap();
        assert_eq!(calls[0].1["lockMode"], 1);
        assert_eq!(calls[0].1["amountToBurn"], "1000");
    }

    #[tokio::test]
    async fn it_surfaces_node_errors_as_rpc_errors() {
        let transport =
            FakeTransport::default().with_error("platform.spend", "insufficient funds");
        let rpc = PlatformRpc::new(transport, "platform");
        let request = SpendRequest {
            from: vec![],
            signer: vec![],
            to: None,
            change: None,
            lock_mode: 0,
            amount_to_lock: "1".to_owned(),
            amount_to_burn: "0".to_owned(),
            as_of: "0".to_owned(),
            encoding: "hex".to_owned(),
            agent: None,
        };
        match SpendRpc::spend(&rpc, request).await {
            Err(CaminoError::Rpc(message)) => assert!(message.contains("insufficient funds")),
            other => panic!("expected Rpc error, got {:?}", other),
        }
    }
}
