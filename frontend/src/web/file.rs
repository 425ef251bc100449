//! 文件选择框读取

use shopadmin::error::{AdminError, AdminResult};
use shopadmin_shared::ProductImage;
use wasm_bindgen_futures::JsFuture;

/// 取 `<input type="file">` 当前选中的第一个文件
pub fn selected_file(input: &web_sys::HtmlInputElement) -> Option<web_sys::File> {
    input.files().and_then(|files| files.get(0))
}

/// 把浏览器 `File` 读进内存，作为商品图片上传
pub async fn read_image(file: web_sys::File) -> AdminResult<ProductImage> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| AdminError::invalid_input(format!("读取文件失败: {:?}", e)))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    Ok(ProductImage {
        file_name: file.name(),
        content_type: file.type_(),
        bytes,
    })
}
