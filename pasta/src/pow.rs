// PoW ハッシュのルーティング。
//
// CryptoNight 系ハッシュの実装自体は外部依存で、ここではコンテキストの契約
// （大きなスクラッチパッドの再利用・借用）とフォークによるアルゴリズム切替のみを扱う。
use crate::block::Block;

/// The networks of the pasta protocol.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Network {
  /// The production network.
  Mainnet,
  /// The test network.
  Testnet,
  /// The staging network.
  Stagenet,
}

/// The proof-of-work algorithm upgrades, each activated by a hard fork.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PowFork {
  /// The CN-Heavy algorithm.
  CnHeavy,
  /// The CN-GPU algorithm.
  CnGpu,
}

/// The hard fork version a proof-of-work upgrade activates at, `None` if it never does on this
/// network.
pub fn fork_version(network: Network, fork: PowFork) -> Option<u8> {
  match (network, fork) {
    (_, PowFork::CnHeavy) => Some(3),
    (Network::Mainnet | Network::Testnet, PowFork::CnGpu) => Some(6),
    // Stagenet activates CN-GPU early so the miner pipeline can be staged against it
    (Network::Stagenet, PowFork::CnGpu) => Some(4),
  }
}

/// A proof-of-work hash context.
///
/// Implementations own large scratchpads. Contexts are created by the caller and reused across
/// blocks so their allocation amortizes.
pub trait PowHash {
  /// Hash the provided data.
  fn hash(&mut self, data: &[u8]) -> [u8; 32];
}

/// A CN-Heavy hash context whose scratchpad the other algorithms may cheaply borrow.
pub trait CnHeavyContext: PowHash {
  /// A CN v1 context borrowing this context's scratchpad.
  type V1<'a>: PowHash
  where
    Self: 'a;
  /// A CN-GPU context borrowing this context's scratchpad.
  type V3<'a>: PowHash
  where
    Self: 'a;

  /// Borrow this context's scratchpad as a CN v1 context.
  fn borrow_v1(&mut self) -> Self::V1<'_>;
  /// Borrow this context's scratchpad as a CN-GPU context.
  fn borrow_v3(&mut self) -> Self::V3<'_>;
}

/// The proof-of-work hash of a block.
///
/// The algorithm is routed by the block's hard fork version: CN-GPU if activated, else CN-Heavy
/// if activated, else CN v1. A fork disabled on this network is never triggered.
pub fn block_pow_hash<C: CnHeavyContext>(
  network: Network,
  block: &Block,
  ctx: &mut C,
) -> [u8; 32] {
  let blob = block.hashing_blob();

  let cn_heavy = fork_version(network, PowFork::CnHeavy);
  let cn_gpu = fork_version(network, PowFork::CnGpu);

  if cn_gpu.is_some_and(|version| block.header.major_version >= version) {
    ctx.borrow_v3().hash(&blob)
  } else if cn_heavy.is_some_and(|version| block.header.major_version >= version) {
    ctx.hash(&blob)
  } else {
    ctx.borrow_v1().hash(&blob)
  }
}
