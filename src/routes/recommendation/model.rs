use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TravelTime {
    pub participant: String,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationInfo {
    pub id: i32,
    pub name: String,
    pub rating: f64,
    pub category: String,
    pub parking: String,
    pub times: Vec<TravelTime>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub results: Vec<RecommendationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_dates: Option<Vec<NaiveDate>>,
}

// 推荐结果目前是结果页展示用的固定假资料
pub fn mock_results() -> Vec<RecommendationInfo> {
    vec![
        RecommendationInfo {
            id: 1,
            name: "台北車站 M8 出口".into(),
            rating: 4.5,
            category: "公共地標".into(),
            parking: "附近有多個收費停車場".into(),
            times: vec![
                TravelTime {
                    participant: "🚗 我 (八里)".into(),
                    time: "約 25 分鐘".into(),
                },
                TravelTime {
                    participant: "🚇 參與者 1 (信義)".into(),
                    time: "約 30 分鐘".into(),
                },
            ],
        },
        RecommendationInfo {
            id: 2,
            name: "捷運中山站 4 號出口".into(),
            rating: 4.3,
            category: "商業區".into(),
            parking: "地下停車場，費用較高".into(),
            times: vec![
                TravelTime {
                    participant: "🚗 我 (八里)".into(),
                    time: "約 30 分鐘".into(),
                },
                TravelTime {
                    participant: "🚇 參與者 1 (信義)".into(),
                    time: "約 28 分鐘".into(),
                },
            ],
        },
        RecommendationInfo {
            id: 3,
            name: "西門町徒步區入口".into(),
            rating: 4.2,
            category: "觀光區".into(),
            parking: "周邊停車位緊張".into(),
            times: vec![
                TravelTime {
                    participant: "🚗 我 (八里)".into(),
                    time: "約 35 分鐘".into(),
                },
                TravelTime {
                    participant: "🚇 參與者 1 (信義)".into(),
                    time: "約 25 分鐘".into(),
                },
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_results_are_three_stable_cards() {
        let results = mock_results();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].name, "台北車站 M8 出口");
        assert!(results.iter().all(|r| r.times.len() == 2));
    }
}
