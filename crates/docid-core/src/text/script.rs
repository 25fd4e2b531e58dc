//! Simplified to traditional Chinese conversion.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Converts OCR output to traditional Chinese before keyword matching.
pub trait ScriptConverter: Send + Sync {
    /// Convert text to traditional characters. Must be idempotent.
    fn to_traditional(&self, text: &str) -> String;
}

/// Character pairs `simplified, traditional`, flattened.
///
/// Limited to characters printed on the supported documents and common
/// surnames/given-name characters. Characters whose simplified form is also a
/// distinct traditional character in Taiwanese use (游, 余, 台, 干, 后) are left
/// alone so real names survive conversion.
const PAIRS: &str = concat!(
    "证證护護别別发發换換统統编編号號华華国國险險纪紀录錄额額",
    "乡鄉镇鎮区區县縣邻鄰湾灣东東门門车車铁鐵运運长長内內务務签簽",
    "机機关關类類岁歲时時间間费費账賬户戶单單据據实實际際应應状狀",
    "态態记記载載补補领領当當园園厅廳楼樓层層阳陽桥橋马馬鸟鳥鱼魚",
    "问問们們个個这這说說请請认認识識读讀码碼确確称稱亲親属屬双雙",
    "汉漢满滿广廣陈陳刘劉杨楊黄黃赵趙吴吳郑鄭谢謝许許苏蘇叶葉萧蕭",
    "罗羅庄莊钟鍾邓鄧冯馮韩韓龙龍凤鳳丽麗伟偉杰傑红紅兰蘭宝寶贵貴",
    "荣榮义義礼禮仪儀宁寧书書云雲达達丰豐兴興进進庆慶爱愛顺順凯凱",
    "辉輝军軍亚亞为為医醫卫衛养養务務历歷职職业業学學师師场場站站",
    "处處离離婚婚丧喪复復办辦属屬军軍团團营營级級总總经經济濟产產",
);

lazy_static! {
    static ref TABLE: HashMap<char, char> = {
        let chars: Vec<char> = PAIRS.chars().collect();
        chars
            .chunks(2)
            .filter(|pair| pair.len() == 2 && pair[0] != pair[1])
            .map(|pair| (pair[0], pair[1]))
            .collect()
    };
}

/// Table-driven converter covering document vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraditionalConverter;

impl TraditionalConverter {
    pub fn new() -> Self {
        Self
    }

    /// Number of characters the table converts.
    pub fn table_size(&self) -> usize {
        TABLE.len()
    }
}

impl ScriptConverter for TraditionalConverter {
    fn to_traditional(&self, text: &str) -> String {
        text.chars()
            .map(|c| TABLE.get(&c).copied().unwrap_or(c))
            .collect()
    }
}
