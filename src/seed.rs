// 🌱 Seed Data - the launch catalog
//
// Written as JSON documents so the records read like the data source they
// stand in for. Risk levels keep the Portuguese labels of the launch data;
// `RiskLevel` normalizes them.

use crate::entities::{Broker, Provider, Testimonial};
use anyhow::{Context, Result};
use serde_json::json;

pub fn default_providers() -> Result<Vec<Provider>> {
    let docs = json!([
        {
            "id": "1",
            "name": "Alpha Signals",
            "winRate": 87,
            "tradesLastMonth": 156,
            "signalTypes": ["Forex", "Crypto"],
            "subscriptionPrice": 99,
            "rating": 4.8,
            "followers": 2340,
            "description": "Conservative strategies focused on capital preservation",
            "riskLevel": "Baixo",
            "avgPipsProfitMonthly": 450,
            "affiliateUrl": "https://alphasignals.com/subscribe"
        },
        {
            "id": "2",
            "name": "CryptoWave Pro",
            "winRate": 92,
            "tradesLastMonth": 89,
            "signalTypes": ["Crypto", "DeFi"],
            "subscriptionPrice": 149,
            "rating": 4.9,
            "followers": 1890,
            "description": "Specialists in high-volatility crypto moves",
            "riskLevel": "Alto",
            "avgPipsProfitMonthly": 680,
            "affiliateUrl": "https://cryptowavepro.com/join"
        },
        {
            "id": "3",
            "name": "ForexProX Elite",
            "winRate": 84,
            "tradesLastMonth": 203,
            "signalTypes": ["Forex", "CFDs"],
            "subscriptionPrice": 79,
            "rating": 4.7,
            "followers": 3120,
            "description": "High-frequency trading with advanced technical analysis",
            "riskLevel": "Médio",
            "avgPipsProfitMonthly": 380,
            "affiliateUrl": "https://forexprox.com/premium"
        },
        {
            "id": "4",
            "name": "GoldMaster Signals",
            "winRate": 89,
            "tradesLastMonth": 67,
            "signalTypes": ["Commodities", "Forex"],
            "subscriptionPrice": 119,
            "rating": 4.6,
            "followers": 1450,
            "description": "Precious metals and commodities specialists",
            "riskLevel": "Baixo",
            "avgPipsProfitMonthly": 520,
            "affiliateUrl": "https://goldmaster.com/subscribe"
        },
        {
            "id": "5",
            "name": "Scalping Masters",
            "winRate": 78,
            "tradesLastMonth": 421,
            "signalTypes": ["Forex", "Indices"],
            "subscriptionPrice": 199,
            "rating": 4.4,
            "followers": 2890,
            "description": "High-frequency scalping for experienced traders",
            "riskLevel": "Alto",
            "avgPipsProfitMonthly": 750,
            "affiliateUrl": "https://scalpingmasters.com/vip"
        },
        {
            "id": "6",
            "name": "Swing Profits",
            "winRate": 91,
            "tradesLastMonth": 34,
            "signalTypes": ["Forex", "Stocks"],
            "subscriptionPrice": 89,
            "rating": 4.8,
            "followers": 1670,
            "description": "Swing trading with 2-5 day holds",
            "riskLevel": "Médio",
            "avgPipsProfitMonthly": 320,
            "affiliateUrl": "https://swingprofits.com/access"
        }
    ]);

    serde_json::from_value(docs).context("Failed to build seed providers")
}

pub fn default_brokers() -> Result<Vec<Broker>> {
    let docs = json!([
        {
            "id": "1",
            "name": "TradeMax Pro",
            "accountTypes": ["Standard", "Premium", "VIP"],
            "minDeposit": 100,
            "maxLeverage": "1:500",
            "spreadsFrom": 0.1,
            "bonus": "100% deposit bonus up to $5000",
            "rating": 4.7,
            "regulation": ["CySEC", "FCA"],
            "instruments": ["Forex", "Crypto", "CFDs", "Commodities"],
            "platformsSupported": ["MT4", "MT5", "WebTrader"],
            "withdrawalTime": "24h",
            "customerSupport": "24/7",
            "affiliateUrl": "https://trademaxpro.com/register"
        },
        {
            "id": "2",
            "name": "BlueFX Global",
            "accountTypes": ["Basic", "Advanced", "Professional"],
            "minDeposit": 250,
            "maxLeverage": "1:400",
            "spreadsFrom": 0.2,
            "bonus": "50% welcome bonus",
            "rating": 4.5,
            "regulation": ["ASIC", "CySEC"],
            "instruments": ["Forex", "Indices", "Commodities"],
            "platformsSupported": ["MT4", "cTrader"],
            "withdrawalTime": "1-3 days",
            "customerSupport": "24/5",
            "affiliateUrl": "https://bluefxglobal.com/signup"
        },
        {
            "id": "3",
            "name": "PrimeMarkets",
            "accountTypes": ["Starter", "Professional", "Institutional"],
            "minDeposit": 500,
            "maxLeverage": "1:200",
            "spreadsFrom": 0.0,
            "bonus": "Zero spreads promo",
            "rating": 4.8,
            "regulation": ["FCA", "ASIC", "CySEC"],
            "instruments": ["Forex", "Crypto", "Stocks", "ETFs"],
            "platformsSupported": ["MT5", "TradingView", "WebPlatform"],
            "withdrawalTime": "Same day",
            "customerSupport": "24/7",
            "affiliateUrl": "https://primemarkets.com/open-account"
        },
        {
            "id": "4",
            "name": "CryptoEdge Exchange",
            "accountTypes": ["Basic", "Premium"],
            "minDeposit": 50,
            "maxLeverage": "1:100",
            "spreadsFrom": 0.05,
            "bonus": "0% trading fees for 30 days",
            "rating": 4.4,
            "regulation": ["Estonia FIU"],
            "instruments": ["Crypto", "DeFi", "NFTs"],
            "platformsSupported": ["Web App", "Mobile App"],
            "withdrawalTime": "Instant",
            "customerSupport": "24/7",
            "affiliateUrl": "https://cryptoedge.com/register"
        },
        {
            "id": "5",
            "name": "EliteTrade Solutions",
            "accountTypes": ["Standard", "Gold", "Platinum"],
            "minDeposit": 1000,
            "maxLeverage": "1:300",
            "spreadsFrom": 0.3,
            "bonus": "VIP account manager",
            "rating": 4.6,
            "regulation": ["FCA", "CySEC"],
            "instruments": ["Forex", "Commodities", "Indices"],
            "platformsSupported": ["MT4", "MT5", "ProTrader"],
            "withdrawalTime": "24-48h",
            "customerSupport": "24/7",
            "affiliateUrl": "https://elitetrade.com/account"
        }
    ]);

    serde_json::from_value(docs).context("Failed to build seed brokers")
}

pub fn default_testimonials() -> Result<Vec<Testimonial>> {
    let docs = json!([
        {
            "id": "1",
            "name": "João Silva",
            "role": "Professional trader",
            "avatar": "JS",
            "rating": 5,
            "text": "I've used the platform for 8 months and grew my capital by 340%. The signal providers really are verified and reliable.",
            "location": "Lisbon, Portugal"
        },
        {
            "id": "2",
            "name": "Maria Santos",
            "role": "Day trader",
            "avatar": "MS",
            "rating": 5,
            "text": "The transparency of the statistics is impressive. I finally found providers who deliver what they promise.",
            "location": "Porto, Portugal"
        },
        {
            "id": "3",
            "name": "Carlos Pereira",
            "role": "Swing investor",
            "avatar": "CP",
            "rating": 4,
            "text": "Intuitive platform and brokers with excellent conditions. Support is always helpful and quick to answer.",
            "location": "Coimbra, Portugal"
        }
    ]);

    serde_json::from_value(docs).context("Failed to build seed testimonials")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::entities::RiskLevel;

    #[test]
    fn test_seed_catalogs_are_valid() {
        let providers = Catalog::new(default_providers().unwrap()).unwrap();
        let brokers = Catalog::new(default_brokers().unwrap()).unwrap();

        assert_eq!(providers.len(), 6);
        assert_eq!(brokers.len(), 5);
        assert_eq!(providers.get("3").unwrap().risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_seed_testimonials_are_approved() {
        let testimonials = default_testimonials().unwrap();

        assert_eq!(testimonials.len(), 3);
        assert!(testimonials.iter().all(|t| t.approved && t.validate().is_ok()));
    }
}
