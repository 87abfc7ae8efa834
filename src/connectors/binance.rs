// src/connectors/binance.rs
use crate::connectors::messages::{BinanceOrderResult, BinanceTickerPrice};
use crate::connectors::traits::{ExecutionGateway, MarketSource};
use crate::error::{ExecutionError, MarketError};
use crate::types::{Action, Fill};
use crate::utils::precision::normalize_price;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method};
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use tracing::{error, info};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Price/size rules applied to live orders.
#[derive(Debug, Clone, Copy)]
pub struct OrderRules {
    /// Fraction the limit price is moved against us so the IOC order crosses.
    pub slippage: Decimal,
    pub tick_size: Decimal,
}

#[derive(Clone)]
pub struct BinanceClient {
    api_key: String,
    secret_key: String,
    http_client: Client,
    base_rest_url: String,
    rules: OrderRules,
}

impl BinanceClient {
    pub fn new(
        api_key: String,
        secret_key: String,
        base_rest_url: impl Into<String>,
        rules: OrderRules,
    ) -> Self {
        Self {
            api_key,
            secret_key,
            http_client: Client::new(),
            base_rest_url: base_rest_url.into().trim_end_matches('/').to_string(),
            rules,
        }
    }

    fn sign_and_build_query(&self, params: Vec<(&str, String)>) -> Result<String> {
        let mut params = params;
        let timestamp = Utc::now().timestamp_millis().to_string();
        params.push(("timestamp", timestamp));

        let query_string = serde_urlencoded::to_string(&params)?;

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .context("Invalid secret key length")?;
        mac.update(query_string.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(format!("{}&signature={}", query_string, signature))
    }

    async fn send_signed_request<T: for<'de> Deserialize<'de>>(
        &self,
        method: Method,
        endpoint: &str,
        params: Vec<(&str, String)>,
    ) -> Result<T> {
        let full_query = self.sign_and_build_query(params)?;
        let url = format!("{}{}?{}", self.base_rest_url, endpoint, full_query);

        let response = self
            .http_client
            .request(method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<T>().await?)
    }

    async fn fetch_price(&self, symbol: &str) -> Result<Decimal> {
        let url = format!("{}/api/v3/ticker/price", self.base_rest_url);
        let ticker = self
            .http_client
            .get(&url)
            .query(&[("symbol", symbol)])
            .send()
            .await?
            .error_for_status()?
            .json::<BinanceTickerPrice>()
            .await
            .with_context(|| format!("Failed to parse price for {}", symbol))?;

        if ticker.price <= Decimal::ZERO {
            bail!("non-positive price {} for {}", ticker.price, ticker.symbol);
        }
        Ok(ticker.price)
    }

    /// Limit price for an IOC order that should behave like a taker.
    fn limit_price(&self, action: Action, reference_price: Decimal) -> Decimal {
        let raw = match action {
            Action::Sell => reference_price * (Decimal::ONE - self.rules.slippage),
            _ => reference_price * (Decimal::ONE + self.rules.slippage),
        };
        normalize_price(raw, self.rules.tick_size)
    }

    async fn place_order(
        &self,
        symbol: &str,
        action: Action,
        quantity: Decimal,
        reference_price: Decimal,
    ) -> Result<Fill> {
        let side_str = match action {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => bail!("hold is not an order"),
        };
        let price = self.limit_price(action, reference_price);

        // LIMIT IOC: fills immediately against the book or is cancelled,
        // so an order never rests on the exchange.
        let params = vec![
            ("symbol", symbol.to_string()),
            ("side", side_str.to_string()),
            ("type", "LIMIT".to_string()),
            ("timeInForce", "IOC".to_string()),
            ("quantity", quantity.normalize().to_string()),
            ("price", price.normalize().to_string()),
            ("newOrderRespType", "RESULT".to_string()),
        ];

        info!(symbol, side = side_str, %quantity, %price, "Sending order");

        let result: BinanceOrderResult = self
            .send_signed_request(Method::POST, "/api/v3/order", params)
            .await?;

        let avg_price = result
            .average_price()
            .ok_or_else(|| anyhow!("order {} not filled (status {})", result.order_id, result.status))?;

        if result.executed_qty != quantity {
            // Partial fills are not modelled; the remote side already traded,
            // so this needs a human to reconcile.
            error!(
                order_id = result.order_id,
                requested = %quantity,
                executed = %result.executed_qty,
                "Partial fill on {}",
                result.symbol
            );
            bail!(
                "order {} partially filled: {} of {}",
                result.order_id,
                result.executed_qty,
                quantity
            );
        }

        Ok(Fill {
            price: avg_price,
            quantity: result.executed_qty,
        })
    }
}

#[async_trait]
impl MarketSource for BinanceClient {
    async fn get_price(&self, symbol: &str) -> Result<Decimal, MarketError> {
        self.fetch_price(symbol)
            .await
            .map_err(|e| MarketError::Unavailable {
                symbol: symbol.to_string(),
                reason: format!("{:#}", e),
            })
    }
}

#[async_trait]
impl ExecutionGateway for BinanceClient {
    async fn execute(
        &self,
        symbol: &str,
        action: Action,
        quantity: Decimal,
        reference_price: Decimal,
    ) -> Result<Fill, ExecutionError> {
        self.place_order(symbol, action, quantity, reference_price)
            .await
            .map_err(|e| ExecutionError::Failed {
                symbol: symbol.to_string(),
                reason: format!("{:#}", e),
            })
    }
}
