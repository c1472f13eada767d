//! Vocabulary catalog
//!
//! Static words grouped by tone pattern. A tone pattern is one digit per
//! syllable, drawn from 1-4. Translations are Swedish glosses.

use serde::Serialize;

/// A single catalog word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WordEntry {
    /// Hanzi text
    pub text: &'static str,
    /// Tone digits, one per syllable
    pub tones: &'static str,
    /// Gloss shown after a correct answer
    pub translation: &'static str,
}

const fn word(text: &'static str, tones: &'static str, translation: &'static str) -> WordEntry {
    WordEntry {
        text,
        tones,
        translation,
    }
}

/// Single-syllable patterns
pub const SINGLE_TONES: [&str; 4] = ["1", "2", "3", "4"];

/// Two-syllable patterns, row-major by first digit
pub const DOUBLE_TONES: [&str; 16] = [
    "11", "12", "13", "14", "21", "22", "23", "24", "31", "32", "33", "34", "41", "42", "43", "44",
];

static CATALOG: &[(&str, &[WordEntry])] = &[
    (
        "1",
        &[
            word("一", "1", "ett; en"),
            word("天", "1", "dag; himmel"),
            word("中", "1", "mitten; central"),
            word("书", "1", "bok"),
            word("东", "1", "öst"),
            word("新", "1", "ny"),
            word("多", "1", "många; mer"),
            word("开", "1", "öppna; starta"),
            word("高", "1", "hög"),
            word("家", "1", "hem; familj"),
        ],
    ),
    (
        "2",
        &[
            word("人", "2", "person; människa"),
            word("时", "2", "tid"),
            word("学", "2", "studera; lära"),
            word("前", "2", "fram; före"),
            word("来", "2", "komma"),
            word("行", "2", "fungera; gå bra"),
            word("年", "2", "år"),
            word("同", "2", "samma"),
            word("儿", "2", "barn; son"),
            word("国", "2", "land; stat"),
        ],
    ),
    (
        "3",
        &[
            word("我", "3", "jag"),
            word("你", "3", "du"),
            word("好", "3", "bra; god"),
            word("有", "3", "ha; finnas"),
            word("想", "3", "tänka; vilja"),
            word("里", "3", "i; inuti"),
            word("买", "3", "köpa"),
            word("老", "3", "gammal; äldre"),
            word("小", "3", "liten"),
            word("水", "3", "vatten"),
        ],
    ),
    (
        "4",
        &[
            word("是", "4", "vara (är)"),
            word("不", "4", "inte"),
            word("大", "4", "stor"),
            word("去", "4", "gå; åka"),
            word("看", "4", "titta; se"),
            word("会", "4", "kunna; möte"),
            word("上", "4", "upp; på"),
            word("下", "4", "ner; under"),
            word("在", "4", "vara i; finnas"),
            word("要", "4", "vilja; behöva"),
        ],
    ),
    (
        "11",
        &[
            word("今天", "11", "idag"),
            word("医生", "11", "läkare"),
            word("公司", "11", "företag"),
            word("咖啡", "11", "kaffe"),
            word("飞机", "11", "flygplan"),
            word("声音", "11", "ljud"),
            word("书包", "11", "skolväska"),
            word("交通", "11", "trafik; transport"),
            word("开车", "11", "köra bil"),
            word("司机", "11", "chaufför"),
        ],
    ),
    (
        "12",
        &[
            word("中国", "12", "Kina"),
            word("中文", "12", "kinesiska (språk)"),
            word("新闻", "12", "nyheter"),
            word("公园", "12", "park"),
            word("花园", "12", "trädgård"),
            word("当然", "12", "självklart; förstås"),
            word("虽然", "12", "fastän; även om"),
            word("依然", "12", "fortfarande"),
            word("交流", "12", "utbyta; kommunicera"),
            word("光荣", "12", "ära; heder"),
        ],
    ),
    (
        "13",
        &[
            word("开始", "13", "börja; starta"),
            word("机场", "13", "flygplats"),
            word("方法", "13", "metod; sätt"),
            word("清楚", "13", "tydlig; klart"),
            word("刚好", "13", "precis lagom; just i tid"),
            word("商场", "13", "köpcentrum"),
            word("发表", "13", "publicera; uttrycka"),
            word("参考", "13", "referens; hänvisa till"),
            word("听懂", "13", "förstå (när man hör)"),
            word("心里", "13", "innerst inne; i hjärtat"),
        ],
    ),
    (
        "14",
        &[
            word("工作", "14", "arbete; jobba"),
            word("知道", "14", "veta"),
            word("希望", "14", "hoppas; hopp"),
            word("帮助", "14", "hjälpa; hjälp"),
            word("高兴", "14", "glad"),
            word("天气", "14", "väder"),
            word("需要", "14", "behöva"),
            word("生日", "14", "födelsedag"),
            word("关系", "14", "relation"),
            word("经济", "14", "ekonomi"),
        ],
    ),
    (
        "21",
        &[
            word("学生", "21", "student; elev"),
            word("时间", "21", "tid"),
            word("明天", "21", "imorgon"),
            word("昨天", "21", "igår"),
            word("国家", "21", "land; nation"),
            word("文章", "21", "artikel; text"),
            word("房间", "21", "rum"),
            word("钱包", "21", "plånbok"),
            word("南方", "21", "söder; södra delen"),
            word("人家", "21", "andra; folk (vardagligt)"),
        ],
    ),
    (
        "22",
        &[
            word("学习", "22", "studera; lära sig"),
            word("同学", "22", "klasskamrat"),
            word("人民", "22", "folk; befolkning"),
            word("由于", "22", "på grund av"),
            word("然而", "22", "dock; emellertid"),
            word("及时", "22", "i tid; i rätt tid"),
            word("留学", "22", "studera utomlands"),
            word("形容", "22", "beskriva"),
            word("实习", "22", "praktik; praktisera"),
            word("其余", "22", "resten; övriga"),
        ],
    ),
    (
        "23",
        &[
            word("没有", "23", "inte ha; sakna"),
            word("如果", "23", "om"),
            word("还有", "23", "dessutom; också ha"),
            word("结果", "23", "resultat"),
            word("人口", "23", "befolkning"),
            word("传统", "23", "tradition"),
            word("合理", "23", "rimlig"),
            word("词典", "23", "ordbok"),
            word("明显", "23", "tydlig; uppenbar"),
            word("成本", "23", "kostnad"),
        ],
    ),
    (
        "24",
        &[
            word("然后", "24", "sedan; därefter"),
            word("文化", "24", "kultur"),
            word("城市", "24", "stad"),
            word("颜色", "24", "färg"),
            word("条件", "24", "villkor"),
            word("人类", "24", "mänskligheten"),
            word("词汇", "24", "ordförråd"),
            word("明确", "24", "tydlig; klargöra"),
            word("形势", "24", "läge; situation"),
            word("其次", "24", "för det andra; näst"),
        ],
    ),
    (
        "31",
        &[
            word("老师", "31", "lärare"),
            word("手机", "31", "mobiltelefon"),
            word("小心", "31", "försiktig; se upp"),
            word("好多", "31", "många; en hel del"),
            word("点心", "31", "snacks; fika (dim sum)"),
            word("早餐", "31", "frukost"),
            word("晚餐", "31", "middag"),
            word("老公", "31", "make (vardagligt)"),
            word("买单", "31", "betala (notan)"),
            word("保安", "31", "säkerhetsvakt"),
        ],
    ),
    (
        "32",
        &[
            word("美国", "32", "USA"),
            word("可能", "32", "kanske; möjlig"),
            word("本来", "32", "egentligen; från början"),
            word("旅游", "32", "resa; turism"),
            word("语言", "32", "språk"),
            word("理由", "32", "anledning"),
            word("选择", "32", "välja; val"),
            word("感觉", "32", "känsla; känna"),
            word("解决", "32", "lösa"),
            word("品牌", "32", "märke; varumärke"),
        ],
    ),
    (
        "33",
        &[
            word("你好", "33", "hej"),
            word("可以", "33", "kan; okej"),
            word("哪里", "33", "var"),
            word("老板", "33", "chef"),
            word("小姐", "33", "fröken; unga damen"),
            word("影响", "33", "påverkan; påverka"),
            word("手表", "33", "armbandsur"),
            word("理想", "33", "ideal; dröm"),
            word("口语", "33", "talspråk"),
            word("洗澡", "33", "duscha; bada"),
        ],
    ),
    (
        "34",
        &[
            word("考试", "34", "prov; examen"),
            word("以后", "34", "senare; efter"),
            word("准备", "34", "förbereda"),
            word("比较", "34", "jämföra; ganska"),
            word("改变", "34", "förändra"),
            word("访问", "34", "besöka"),
            word("讨论", "34", "diskutera"),
            word("感谢", "34", "tacka; vara tacksam"),
            word("保护", "34", "skydda"),
            word("只是", "34", "bara; endast"),
        ],
    ),
    (
        "41",
        &[
            word("地方", "41", "plats; ställe"),
            word("必须", "41", "måste"),
            word("放心", "41", "var lugn; känna sig trygg"),
            word("认真", "41", "seriöst; noggrant"),
            word("细心", "41", "noggrann; omsorgsfull"),
            word("教师", "41", "lärare (formellt)"),
            word("证书", "41", "certifikat; intyg"),
            word("上班", "41", "gå till jobbet; jobba"),
            word("下班", "41", "sluta jobbet"),
            word("看书", "41", "läsa (böcker)"),
        ],
    ),
    (
        "42",
        &[
            word("问题", "42", "problem; fråga"),
            word("事情", "42", "sak; ärende"),
            word("认为", "42", "anse; tycka"),
            word("后来", "42", "senare; sedan"),
            word("内容", "42", "innehåll"),
            word("个人", "42", "individ; personlig"),
            word("过程", "42", "process; förlopp"),
            word("客人", "42", "gäst; kund"),
            word("负责", "42", "ansvara för"),
            word("自然", "42", "natur; naturligt"),
        ],
    ),
    (
        "43",
        &[
            word("办法", "43", "metod; sätt"),
            word("地址", "43", "adress"),
            word("自己", "43", "själv"),
            word("密码", "43", "lösenord; kod"),
            word("记者", "43", "journalist; reporter"),
            word("作者", "43", "författare"),
            word("饭馆", "43", "restaurang"),
            word("进口", "43", "import"),
            word("数码", "43", "digital"),
            word("汉语", "43", "kinesiska (han-kinesiska)"),
        ],
    ),
    (
        "44",
        &[
            word("现在", "44", "nu"),
            word("但是", "44", "men"),
            word("再见", "44", "hej då"),
            word("重要", "44", "viktig"),
            word("世界", "44", "världen"),
            word("电话", "44", "telefon"),
            word("会议", "44", "möte; konferens"),
            word("运动", "44", "träning; sport"),
            word("变化", "44", "förändring"),
            word("见面", "44", "träffas"),
        ],
    ),
];

/// Words for a tone pattern, in catalog order (empty if the pattern is unknown)
pub fn lookup(tones: &str) -> &'static [WordEntry] {
    CATALOG
        .iter()
        .find(|(pattern, _)| *pattern == tones)
        .map(|(_, words)| *words)
        .unwrap_or(&[])
}

/// Every pattern the catalog defines
pub fn patterns() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(pattern, _)| *pattern)
}

/// True for a 1-2 character string of digits 1-4
pub fn is_tone_pattern(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.bytes().all(|b| (b'1'..=b'4').contains(&b))
}
