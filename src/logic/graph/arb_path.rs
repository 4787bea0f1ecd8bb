use super::arb_path_hash::ArbPathHash;
use crate::logic::errors::CalculationError;
use crate::logic::pools::UniswapV3Pool;
use alloy_primitives::Address;
use sha2::digest::Update;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// One swap of a route. The fee is copied from the pool when the hop is built.
#[derive(Clone, Debug)]
pub struct Hop {
    pool: Arc<UniswapV3Pool>,
    token_in: Address,
    token_out: Address,
    decimals_in: u8,
    fee: u32,
}

impl Hop {
    /// A hop selling `token_in` into `pool`.
    pub fn new(pool: Arc<UniswapV3Pool>, token_in: Address) -> Result<Self, CalculationError> {
        let token_out = pool
            .other_token(&token_in)
            .ok_or_else(|| CalculationError::InvalidRoute(format!("token {token_in} is not traded by pool {}", pool.address)))?;
        let decimals_in = if pool.is_token0(&token_in) { pool.decimals0 } else { pool.decimals1 };
        let fee = pool.fee;
        Ok(Self { pool, token_in, token_out, decimals_in, fee })
    }

    pub fn pool(&self) -> &UniswapV3Pool {
        &self.pool
    }

    pub fn pool_address(&self) -> Address {
        self.pool.address
    }

    pub fn token_in(&self) -> Address {
        self.token_in
    }

    pub fn token_out(&self) -> Address {
        self.token_out
    }

    pub fn fee(&self) -> u32 {
        self.fee
    }

    pub fn token0_is_input(&self) -> bool {
        self.pool.is_token0(&self.token_in)
    }
}

impl PartialEq for Hop {
    fn eq(&self, other: &Self) -> bool {
        self.pool.address == other.pool.address && self.token_in == other.token_in
    }
}

impl Eq for Hop {}

impl Hash for Hop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pool.address.hash(state);
        self.token_in.hash(state);
    }
}

/// A closed 2 or 3 hop swap route starting and ending at the base token.
///
/// Construction checks the hop count, token continuity, that the last hop returns to the first hop's input
/// and that every hop goes through a different pool. The route cannot be changed afterwards.
#[derive(Clone, Debug, Eq)]
pub struct ArbPath {
    hash: ArbPathHash,
    hops: Vec<Hop>,
}

impl Display for ArbPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ArbPath(pools={:?}, tokens={:?})",
            self.hops.iter().map(|hop| format!("{:#}", hop.pool_address())).collect::<Vec<String>>(),
            self.tokens().iter().map(|token| format!("{token:#}")).collect::<Vec<String>>()
        )
    }
}

impl ArbPath {
    pub const MIN_HOPS: usize = 2;
    pub const MAX_HOPS: usize = 3;

    pub fn new(hops: Vec<Hop>) -> Result<Self, CalculationError> {
        if !(Self::MIN_HOPS..=Self::MAX_HOPS).contains(&hops.len()) {
            return Err(CalculationError::InvalidRoute(format!("expected 2 or 3 hops, got {}", hops.len())));
        }

        for (i, pair) in hops.windows(2).enumerate() {
            if pair[0].token_out != pair[1].token_in {
                return Err(CalculationError::InvalidRoute(format!(
                    "hop {i} ends at {} but hop {} starts at {}",
                    pair[0].token_out,
                    i + 1,
                    pair[1].token_in
                )));
            }
        }

        let (Some(first), Some(last)) = (hops.first(), hops.last()) else {
            return Err(CalculationError::InvalidRoute("route is empty".to_string()));
        };
        if first.token_in != last.token_out {
            return Err(CalculationError::InvalidRoute(format!(
                "route starts at {} but ends at {}",
                first.token_in, last.token_out
            )));
        }

        let distinct_pools: HashSet<Address> = hops.iter().map(Hop::pool_address).collect();
        if distinct_pools.len() != hops.len() {
            return Err(CalculationError::InvalidRoute(format!(
                "{} hops share {} distinct pools",
                hops.len(),
                distinct_pools.len()
            )));
        }

        let hash = generate_arb_path_hash(&hops);
        Ok(Self { hash, hops })
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    /// The hop count of the route
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn hash(&self) -> &ArbPathHash {
        &self.hash
    }

    /// The token the route starts from and returns to.
    pub fn base_token(&self) -> Address {
        self.hops[0].token_in
    }

    pub fn base_decimals(&self) -> u8 {
        self.hops[0].decimals_in
    }

    /// Token sequence including the closing base token, e.g. `base -> a -> b -> base`.
    pub fn tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<Address> = self.hops.iter().map(Hop::token_in).collect();
        tokens.push(self.hops[self.hops.len() - 1].token_out);
        tokens
    }

    pub fn pool_addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.hops.iter().map(Hop::pool_address)
    }

    pub fn has_pool(&self, pool: &Address) -> bool {
        self.hops.iter().any(|hop| hop.pool_address() == *pool)
    }

    /// True when any hop buys or sells one of `tokens`.
    pub fn touches_any_token(&self, tokens: &[Address]) -> bool {
        self.hops.iter().any(|hop| tokens.contains(&hop.token_in) || tokens.contains(&hop.token_out))
    }
}

impl Hash for ArbPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hops.hash(state);
    }
}

impl PartialEq for ArbPath {
    fn eq(&self, other: &Self) -> bool {
        self.hops == other.hops
    }
}

/// Hash the token sequence and then the pool sequence of the route to a sha256 hash.
/// Stable across runs, so it can key stored results.
pub fn generate_arb_path_hash(hops: &[Hop]) -> ArbPathHash {
    let mut hasher = Sha256::new();

    for hop in hops.iter() {
        Update::update(&mut hasher, hop.token_in.as_slice());
    }
    if let Some(last) = hops.last() {
        Update::update(&mut hasher, last.token_out.as_slice());
    }
    for hop in hops.iter() {
        Update::update(&mut hasher, hop.pool_address().as_slice());
    }

    let hash_slice: [u8; 32] = hasher.finalize().into();
    ArbPathHash::from(hash_slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(token0: u8, token1: u8, address: u8) -> Arc<UniswapV3Pool> {
        Arc::new(
            UniswapV3Pool::new(
                Address::repeat_byte(address),
                Address::repeat_byte(token0),
                Address::repeat_byte(token1),
                3000,
                18,
                18,
                1_000_000,
            )
            .unwrap(),
        )
    }

    fn token(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn triangle() -> ArbPath {
        let hops = vec![
            Hop::new(pool(1, 2, 10), token(1)).unwrap(),
            Hop::new(pool(2, 3, 11), token(2)).unwrap(),
            Hop::new(pool(3, 1, 12), token(3)).unwrap(),
        ];
        ArbPath::new(hops).unwrap()
    }

    #[test]
    fn test_new_triangle() {
        let path = triangle();

        assert_eq!(path.len(), 3);
        assert_eq!(path.base_token(), token(1));
        assert_eq!(path.base_decimals(), 18);
        assert_eq!(path.tokens(), vec![token(1), token(2), token(3), token(1)]);
        assert_eq!(path.pool_addresses().collect::<Vec<_>>(), vec![token(10), token(11), token(12)]);
        assert!(path.has_pool(&token(11)));
        assert!(!path.has_pool(&token(13)));
        assert_eq!(path.hops()[2].fee(), 3000);
        assert!(path.hops()[0].token0_is_input());
    }

    #[test]
    fn test_hop_rejects_foreign_token() {
        assert!(matches!(Hop::new(pool(1, 2, 10), token(3)), Err(CalculationError::InvalidRoute(_))));
    }

    #[test]
    fn test_broken_continuity() {
        let hops = vec![
            Hop::new(pool(1, 2, 10), token(1)).unwrap(),
            Hop::new(pool(3, 4, 11), token(3)).unwrap(),
            Hop::new(pool(4, 1, 12), token(4)).unwrap(),
        ];
        assert!(matches!(ArbPath::new(hops), Err(CalculationError::InvalidRoute(_))));
    }

    #[test]
    fn test_not_closed() {
        let hops = vec![Hop::new(pool(1, 2, 10), token(1)).unwrap(), Hop::new(pool(2, 3, 11), token(2)).unwrap()];
        assert!(matches!(ArbPath::new(hops), Err(CalculationError::InvalidRoute(_))));
    }

    #[test]
    fn test_hop_count_bounds() {
        let single = vec![Hop::new(pool(1, 2, 10), token(1)).unwrap()];
        assert!(ArbPath::new(single).is_err());

        let four = vec![
            Hop::new(pool(1, 2, 10), token(1)).unwrap(),
            Hop::new(pool(2, 3, 11), token(2)).unwrap(),
            Hop::new(pool(3, 4, 12), token(3)).unwrap(),
            Hop::new(pool(4, 1, 13), token(4)).unwrap(),
        ];
        assert!(ArbPath::new(four).is_err());
    }

    #[test]
    fn test_two_hop_needs_distinct_pools() {
        let same = vec![Hop::new(pool(1, 2, 10), token(1)).unwrap(), Hop::new(pool(1, 2, 10), token(2)).unwrap()];
        assert!(ArbPath::new(same).is_err());

        let distinct = vec![Hop::new(pool(1, 2, 10), token(1)).unwrap(), Hop::new(pool(2, 1, 11), token(2)).unwrap()];
        let path = ArbPath::new(distinct).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path.tokens(), vec![token(1), token(2), token(1)]);
    }

    #[test]
    fn test_touches_any_token() {
        let path = triangle();
        assert!(path.touches_any_token(&[token(3)]));
        assert!(!path.touches_any_token(&[token(9)]));
        assert!(!path.touches_any_token(&[]));
    }

    #[test]
    fn test_hash_is_stable_and_order_sensitive() {
        let path = triangle();
        assert_eq!(path.hash(), &generate_arb_path_hash(path.hops()));
        assert_eq!(path, triangle());

        let reversed = ArbPath::new(vec![
            Hop::new(pool(3, 1, 12), token(1)).unwrap(),
            Hop::new(pool(2, 3, 11), token(3)).unwrap(),
            Hop::new(pool(1, 2, 10), token(2)).unwrap(),
        ])
        .unwrap();
        assert_ne!(path.hash(), reversed.hash());
        assert_ne!(path, reversed);
    }
}
