//! Built-in idioms that keep the service playable without an external CSV.

use crate::domain::{Idiom, IdiomMetadata};

/// (word, pinyin, derivation, mark) with mark: 0 plain, 1 common, 2 common + simple.
/// Empty pinyin is filled in by the loader.
const SEED_IDIOMS: &[(&str, &str, &str, u8)] = &[
  ("一心一意", "yī xīn yī yì", "《三国志·魏书·杜恕传》", 2),
  ("三心二意", "sān xīn èr yì", "元·关汉卿《救风尘》", 2),
  ("花好月圆", "huā hǎo yuè yuán", "宋·张先《木兰花》", 2),
  ("月落乌啼", "yuè luò wū tí", "唐·张继《枫桥夜泊》", 1),
  ("画蛇添足", "huà shé tiān zú", "《战国策·齐策二》", 2),
  ("守株待兔", "shǒu zhū dài tù", "《韩非子·五蠹》", 2),
  ("亡羊补牢", "wáng yáng bǔ láo", "《战国策·楚策四》", 2),
  ("对牛弹琴", "duì niú tán qín", "汉·牟融《理惑论》", 2),
  ("井底之蛙", "jǐng dǐ zhī wā", "《庄子·秋水》", 2),
  ("半途而废", "bàn tú ér fèi", "《礼记·中庸》", 2),
  ("自相矛盾", "zì xiāng máo dùn", "《韩非子·难一》", 2),
  ("一石二鸟", "yī shí èr niǎo", "无", 1),
  ("一举两得", "yī jǔ liǎng dé", "《晋书·束皙传》", 2),
  ("心花怒放", "xīn huā nù fàng", "无", 2),
  ("心想事成", "", "无", 2),
  ("春暖花开", "chūn nuǎn huā kāi", "无", 2),
  ("鸟语花香", "niǎo yǔ huā xiāng", "宋·吕本中《紫薇·庵居》", 2),
  ("风花雪月", "fēng huā xuě yuè", "宋·邵雍《伊川击壤集序》", 1),
  ("月明星稀", "yuè míng xīng xī", "汉·曹操《短歌行》", 1),
  ("日新月异", "rì xīn yuè yì", "《礼记·大学》", 2),
  ("三言两语", "sān yán liǎng yǔ", "元·关汉卿《单刀会》", 2),
  ("七上八下", "qī shàng bā xià", "元·施耐庵《水浒传》", 2),
  ("五湖四海", "wǔ hú sì hǎi", "无", 2),
  ("四面八方", "sì miàn bā fāng", "宋·释普济《五灯会元》", 2),
  ("天长地久", "tiān cháng dì jiǔ", "《老子》", 2),
  ("天高地厚", "", "《诗经·小雅·正月》", 1),
  ("人山人海", "rén shān rén hǎi", "无", 2),
  ("山清水秀", "shān qīng shuǐ xiù", "宋·黄庭坚《蓦山溪·赠衡阳妓陈湘》", 2),
  ("水落石出", "shuǐ luò shí chū", "宋·苏轼《后赤壁赋》", 2),
  ("千山万水", "qiān shān wàn shuǐ", "唐·宋之问《至端州驿见杜五审言》", 2),
  ("千言万语", "qiān yán wàn yǔ", "无", 2),
  ("万事如意", "wàn shì rú yì", "无", 2),
  ("言而有信", "yán ér yǒu xìn", "《论语·学而》", 1),
  ("有口无心", "yǒu kǒu wú xīn", "元·关汉卿《鲁斋郎》", 1),
  ("口是心非", "kǒu shì xīn fēi", "晋·葛洪《抱朴子·微旨》", 2),
  ("心口如一", "xīn kǒu rú yī", "无", 1),
  ("十全十美", "shí quán shí měi", "无", 2),
  ("美中不足", "měi zhōng bù zú", "无", 2),
  ("不三不四", "bù sān bù sì", "无", 1),
  ("乱七八糟", "luàn qī bā zāo", "无", 2),
  ("朝三暮四", "zhāo sān mù sì", "《庄子·齐物论》", 1),
  ("名落孙山", "míng luò sūn shān", "宋·范公偁《过庭录》", 1),
  ("落花流水", "luò huā liú shuǐ", "唐·李群玉《奉和张舍人送秦炼师归岑公山》", 1),
  ("镜花水月", "jìng huā shuǐ yuè", "无", 0),
  ("闭月羞花", "bì yuè xiū huā", "无", 0),
  ("大公无私", "dà gōng wú sī", "无", 1),
  ("大同小异", "dà tóng xiǎo yì", "《庄子·天下》", 2),
  ("小题大做", "xiǎo tí dà zuò", "无", 2),
];

/// Raw seed records; run them through the same validation as CSV rows.
pub fn seed_idioms() -> Vec<Idiom> {
  SEED_IDIOMS
    .iter()
    .filter_map(|&(word, pinyin, derivation, mark)| {
      Idiom::new(
        word,
        IdiomMetadata {
          pinyin: pinyin.to_string(),
          derivation: derivation.to_string(),
          is_common: mark >= 1,
          is_simple: mark == 2,
        },
      )
    })
    .collect()
}
